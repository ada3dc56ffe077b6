// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for run telemetry.
//!
//! The pipeline emits `ProgressEvent`s as it crawls and classifies, which flow
//! through a `tokio::sync::broadcast` channel to any subscriber (the CLI
//! progress bar, tests). When no subscriber exists, events are dropped.

use serde::{Deserialize, Serialize};

/// One numbered pipeline event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Starts at 1 and grows by one per emitted event.
    pub seq: u64,
    pub event: ProgressEventKind,
}

/// What happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    /// A pipeline stage has started.
    StageStarted { stage: Stage, message: String },
    /// A listing page was read.
    PageCrawled {
        page: u32,
        rows: usize,
        new_candidates: usize,
        total_candidates: usize,
    },
    /// Discovery finished; `total` candidates will be classified.
    CrawlComplete { total: usize, elapsed_ms: u64 },
    /// One candidate reached its final outcome.
    CandidateDone {
        index: usize,
        total: usize,
        identity: String,
        outcome: String,
    },
    /// The run finished.
    RunComplete {
        discovered: usize,
        eligible: usize,
        hits: usize,
        elapsed_ms: u64,
    },
    /// Something degraded but the run continues.
    Warning { message: String },
}

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Crawl,
    Classify,
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crawl => write!(f, "Crawl"),
            Self::Classify => write!(f, "Classify"),
            Self::Report => write!(f, "Report"),
        }
    }
}

pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Bounded channel; a full buffer drops the oldest events for slow receivers.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Sequenced emitter wrapping an optional sender.
#[derive(Debug, Default)]
pub struct ProgressEmitter {
    tx: Option<ProgressSender>,
    seq: u64,
}

impl ProgressEmitter {
    pub fn new(tx: Option<ProgressSender>) -> Self {
        Self { tx, seq: 0 }
    }

    /// Emit an event, ignoring send errors (no receivers listening).
    pub fn emit(&mut self, event: ProgressEventKind) {
        if let Some(ref sender) = self.tx {
            self.seq += 1;
            let _ = sender.send(ProgressEvent {
                seq: self.seq,
                event,
            });
        }
    }
}
