// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! `record-scout run`: crawl, gate, search, and write the report.

use crate::cli::{output, progress_bar};
use crate::config::{self, Overrides};
use crate::renderer::chromium::{ChromiumRenderer, LaunchOptions};
use crate::session::BrowserSession;
use anyhow::{Context, Result};
use record_scout::period::Period;
use record_scout::pipeline::Pipeline;
use record_scout::progress;
use record_scout::report::Section;
use record_scout::store::ExclusionStore;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Options for one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub headful: bool,
}

/// Run the pipeline once.
pub async fn run(options: RunOptions) -> Result<()> {
    let started = Instant::now();

    let (mut config, source) = config::load(options.config.as_deref())?;
    options.overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    info!("configuration: {source}");

    let today = chrono::Local::now().date_naive();
    let period = Period::resolve(&config.period, today)?;
    let start_url = period.query_url(&config.search_url_template);
    let mut store = ExclusionStore::load(&config.exclusion_file);
    info!(
        "tracking {:?} in {period}, {} identities excluded",
        config.tracked_identity,
        store.len()
    );

    let renderer = ChromiumRenderer::launch(LaunchOptions {
        headful: options.headful,
        executable: None,
        request_timeout: Some(config.nav_timeout()),
    })
    .await?;
    let mut session = BrowserSession::open(Box::new(renderer)).await?;

    let (tx, rx) = progress::channel();
    let bar = output::show_progress().then(|| progress_bar::spawn(rx));

    let mut pipeline = Pipeline::new(&config).with_progress(tx);
    let result = pipeline
        .run(session.document(), &mut store, &start_url, Some(period.token()))
        .await;
    // Closing the sender lets the progress task finish.
    drop(pipeline);
    if let Err(e) = session.close().await {
        warn!("{e:#}");
    }
    if let Some(bar) = bar {
        let _ = bar.await;
    }

    let report = result.context("run failed")?;
    let path = report.default_path(&config.output_dir);
    report
        .write_to(&path)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    let elapsed = started.elapsed().as_secs_f64();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "report_path": path,
            "elapsed_secs": elapsed,
            "report": report,
        }));
        return Ok(());
    }
    if !output::is_quiet() {
        for section in Section::ALL {
            println!("  {:<26} {}", section.title(), report.count(section));
        }
        println!();
    }
    println!("Report written to {}", path.display());
    println!("Elapsed: {elapsed:.2} s");
    Ok(())
}
