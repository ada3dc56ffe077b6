// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal rendering of pipeline progress events.

use indicatif::{ProgressBar, ProgressStyle};
use record_scout::progress::{ProgressEventKind, ProgressReceiver};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Spinner shown while walking the listing.
fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar shown while classifying candidates.
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Render events from `rx` until the channel closes.
pub fn spawn(mut rx: ProgressReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut pb = create_spinner();
        pb.set_message("opening listing");
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            match event.event {
                ProgressEventKind::StageStarted { message, .. } => pb.set_message(message),
                ProgressEventKind::PageCrawled {
                    page,
                    total_candidates,
                    ..
                } => pb.set_message(format!("page {page}: {total_candidates} maps")),
                ProgressEventKind::CrawlComplete { total, .. } => {
                    pb.finish_and_clear();
                    pb = create_progress_bar(total as u64);
                }
                ProgressEventKind::CandidateDone {
                    index,
                    identity,
                    outcome,
                    ..
                } => {
                    pb.set_position(index as u64);
                    pb.set_message(format!("{identity} ({outcome})"));
                }
                ProgressEventKind::RunComplete { .. } => pb.finish_and_clear(),
                ProgressEventKind::Warning { message } => pb.println(format!("  warning: {message}")),
            }
        }
        pb.finish_and_clear();
    })
}
