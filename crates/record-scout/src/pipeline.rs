// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sequential run orchestration.
//!
//! Crawl, then for each candidate in discovery order: exclusion-list check,
//! threshold classification, and a leaderboard search when eligible. Per
//! candidate failures become technical exclusions; only a failed listing
//! navigation aborts the run.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::ScoutConfig;
use crate::crawler::{ListCrawler, PageEnd};
use crate::document::RemoteDocument;
use crate::presence::PresenceSearcher;
use crate::progress::{ProgressEmitter, ProgressEventKind, ProgressSender, Stage};
use crate::report::{Report, ReportAggregator, ReportHeader};
use crate::store::ExclusionStore;
use crate::threshold::ThresholdFilter;
use crate::types::{Candidate, Outcome, ScoutResult};

/// Runs the three stages against one document.
pub struct Pipeline<'a> {
    config: &'a ScoutConfig,
    progress: ProgressEmitter,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ScoutConfig) -> Self {
        Self {
            config,
            progress: ProgressEmitter::default(),
        }
    }

    /// Attach a progress channel.
    pub fn with_progress(mut self, tx: ProgressSender) -> Self {
        self.progress = ProgressEmitter::new(Some(tx));
        self
    }

    /// Run from `start_url` and build the report.
    ///
    /// `period` is the token shown in the report header and file name.
    pub async fn run(
        &mut self,
        doc: &mut dyn RemoteDocument,
        store: &mut ExclusionStore,
        start_url: &str,
        period: Option<String>,
    ) -> ScoutResult<Report> {
        let started = Instant::now();
        let crawler = ListCrawler::new(self.config)?;

        self.progress.emit(ProgressEventKind::StageStarted {
            stage: Stage::Crawl,
            message: format!("walking listing {start_url}"),
        });
        info!("crawling {start_url}");
        let crawl = crawler
            .crawl_with_progress(doc, start_url, &mut self.progress)
            .await?;
        if crawl.end == PageEnd::Failed {
            self.progress.emit(ProgressEventKind::Warning {
                message: format!(
                    "listing stopped early after {} pages; continuing with {} candidates",
                    crawl.pages,
                    crawl.candidates.len()
                ),
            });
        }
        let discovered = crawl.candidates;

        self.progress.emit(ProgressEventKind::StageStarted {
            stage: Stage::Classify,
            message: format!("classifying {} candidates", discovered.len()),
        });
        let (excluded_by_list, outcomes) = self.classify_all(doc, store, &discovered).await;

        self.progress.emit(ProgressEventKind::StageStarted {
            stage: Stage::Report,
            message: "building report".to_string(),
        });
        let header = ReportHeader::new(self.config.tracked_identity.clone(), period);
        let mut report =
            ReportAggregator::new(header).build(&discovered, &excluded_by_list, &outcomes);
        let elapsed = started.elapsed();
        report.set_elapsed(elapsed.as_secs_f64());

        info!(
            "run finished: {} discovered, {} listed, {} threshold, {} technical, {} eligible, {} hits in {:.1}s",
            report.discovered.len(),
            report.excluded_by_list.len(),
            report.threshold_excluded.len(),
            report.technical.len(),
            report.eligible.len(),
            report.hits.len(),
            elapsed.as_secs_f64()
        );
        self.progress.emit(ProgressEventKind::RunComplete {
            discovered: report.discovered.len(),
            eligible: report.eligible.len(),
            hits: report.hits.len(),
            elapsed_ms: elapsed.as_millis() as u64,
        });
        Ok(report)
    }

    async fn classify_all(
        &mut self,
        doc: &mut dyn RemoteDocument,
        store: &mut ExclusionStore,
        discovered: &[Candidate],
    ) -> (Vec<Candidate>, Vec<Outcome>) {
        let config = self.config;
        let filter = ThresholdFilter::new(config);
        let searcher = PresenceSearcher::new(
            &config.leaderboard,
            config.dom_timeout(),
            config.nav_timeout(),
        );
        let total = discovered.len();
        let mut excluded_by_list = Vec::new();
        let mut outcomes = Vec::with_capacity(total);

        for (index, candidate) in discovered.iter().enumerate() {
            let tag = if store.contains(&candidate.identity) {
                debug!("{}: on exclusion list", candidate.identity);
                excluded_by_list.push(candidate.clone());
                "listed"
            } else {
                let outcome = match filter.classify(doc, store, candidate).await {
                    Outcome::Eligible(enriched) => {
                        match searcher
                            .search(
                                doc,
                                &enriched.secondary_link,
                                &config.tracked_identity,
                                config.max_expansions,
                            )
                            .await
                        {
                            Ok(true) => Outcome::Hit(enriched),
                            Ok(false) => Outcome::Miss(enriched),
                            Err(e) => Outcome::technical(&enriched.candidate, e.code(), e.to_string()),
                        }
                    }
                    other => other,
                };
                let tag = outcome.tag();
                outcomes.push(outcome);
                tag
            };

            debug!("[{}/{total}] {} -> {tag}", index + 1, candidate.identity);
            self.progress.emit(ProgressEventKind::CandidateDone {
                index: index + 1,
                total,
                identity: candidate.identity.clone(),
                outcome: tag.to_string(),
            });
        }
        (excluded_by_list, outcomes)
    }
}
