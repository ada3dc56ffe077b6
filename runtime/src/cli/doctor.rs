// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use crate::cli::output::{self, Styled};
use crate::config;
use crate::renderer::find_chromium;
use anyhow::Result;
use record_scout::store::ExclusionStore;
use std::path::Path;

/// Check Chromium availability, configuration, and writable paths.
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let chromium = find_chromium();
    let loaded = config::load(config_path);
    let (config_ok, config_detail, exclusions, output_dir) = match &loaded {
        Ok((config, source)) => match config.validate() {
            Ok(()) => (
                true,
                source.to_string(),
                Some(ExclusionStore::load(&config.exclusion_file)),
                Some(config.output_dir.clone()),
            ),
            Err(e) => (false, format!("{source}: {e}"), None, None),
        },
        Err(e) => (false, format!("{e:#}"), None, None),
    };
    let output_ok = output_dir.as_deref().is_some_and(dir_writable);
    let ready = chromium.is_some() && config_ok && output_ok;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "chromium": chromium,
            "config_ok": config_ok,
            "config": config_detail,
            "exclusions": exclusions.as_ref().map(|s| serde_json::json!({
                "path": s.path(),
                "count": s.len(),
            })),
            "output_dir_writable": output_ok,
            "ready": ready,
        }));
        return Ok(());
    }

    let s = Styled::new();
    println!("Record Scout Doctor");
    println!("===================");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    match &chromium {
        Some(path) => println!("{} Chromium found: {}", s.ok_sym(), path.display()),
        None => println!(
            "{} Chromium NOT found. Install Chrome or set RECORD_SCOUT_CHROMIUM_PATH.",
            s.fail_sym()
        ),
    }
    if config_ok {
        println!("{} Configuration: {config_detail}", s.ok_sym());
    } else {
        println!("{} Configuration invalid: {config_detail}", s.fail_sym());
    }
    if let Some(store) = &exclusions {
        println!(
            "{} Exclusion list: {} ({} entries)",
            s.ok_sym(),
            store.path().display(),
            store.len()
        );
    }
    if let Some(dir) = &output_dir {
        if output_ok {
            println!("{} Output directory writable: {}", s.ok_sym(), dir.display());
        } else {
            println!("{} Output directory not writable: {}", s.fail_sym(), dir.display());
        }
    }

    println!();
    println!("Status: {}", if ready { "READY" } else { "NOT READY" });
    Ok(())
}

/// True if a file can be created in `dir` (creating `dir` if needed).
fn dir_writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".record-scout-doctor");
    let ok = std::fs::write(&probe, b"").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}
