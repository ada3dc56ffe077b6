// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data types for discovered candidates and their outcomes.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::store::StoreError;

/// One discovered listing item before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Human-readable name as shown on the listing.
    pub identity: String,
    /// Absolute URL of the detail page. Unique within one crawl.
    pub link: String,
}

impl Candidate {
    pub fn new(identity: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            link: link.into(),
        }
    }

    /// Key used against the exclusion list: trimmed and case-folded.
    pub fn folded_identity(&self) -> String {
        fold_identity(&self.identity)
    }
}

/// Trim and case-fold an identity for set membership checks.
pub fn fold_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

/// A candidate that passed the threshold gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Extracted record count.
    pub signal: u64,
    /// Leaderboard URL found on the detail page.
    pub secondary_link: String,
}

/// Codes for per-candidate failures. None of them aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechnicalCode {
    NavTimeout,
    NavError,
    NoSignalFound,
    NoSecondaryLink,
    SearchTimeout,
    SearchError,
    StoreWriteError,
}

impl std::fmt::Display for TechnicalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::NavTimeout => "NAV_TIMEOUT",
            Self::NavError => "NAV_ERROR",
            Self::NoSignalFound => "NO_SIGNAL_FOUND",
            Self::NoSecondaryLink => "NO_SECONDARY_LINK",
            Self::SearchTimeout => "SEARCH_TIMEOUT",
            Self::SearchError => "SEARCH_ERROR",
            Self::StoreWriteError => "STORE_WRITE_ERROR",
        };
        f.write_str(code)
    }
}

/// Final classification of a candidate that reached the threshold gate.
///
/// `Eligible` is the hand-off value between the threshold and search stages;
/// after a completed run it has normally been replaced by `Hit`, `Miss`, or a
/// `TechnicalExclusion` carrying a search code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Signal above the maximum; the identity was added to the exclusion list.
    Blocked { candidate: Candidate, signal: u64 },
    /// Signal below the minimum.
    TooLow { candidate: Candidate, signal: u64 },
    Eligible(EnrichedCandidate),
    TechnicalExclusion {
        candidate: Candidate,
        code: TechnicalCode,
        detail: String,
    },
    Hit(EnrichedCandidate),
    Miss(EnrichedCandidate),
}

impl Outcome {
    pub fn technical(candidate: &Candidate, code: TechnicalCode, detail: impl Into<String>) -> Self {
        Self::TechnicalExclusion {
            candidate: candidate.clone(),
            code,
            detail: detail.into(),
        }
    }

    /// The candidate this outcome was produced for.
    pub fn candidate(&self) -> &Candidate {
        match self {
            Self::Blocked { candidate, .. }
            | Self::TooLow { candidate, .. }
            | Self::TechnicalExclusion { candidate, .. } => candidate,
            Self::Eligible(e) | Self::Hit(e) | Self::Miss(e) => &e.candidate,
        }
    }

    /// Extracted record count, when one was obtained.
    pub fn signal(&self) -> Option<u64> {
        match self {
            Self::Blocked { signal, .. } | Self::TooLow { signal, .. } => Some(*signal),
            Self::Eligible(e) | Self::Hit(e) | Self::Miss(e) => Some(e.signal),
            Self::TechnicalExclusion { .. } => None,
        }
    }

    /// Short tag used in logs and progress events.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Blocked { .. } => "blocked",
            Self::TooLow { .. } => "too_low",
            Self::Eligible(_) => "eligible",
            Self::TechnicalExclusion { .. } => "technical",
            Self::Hit(_) => "hit",
            Self::Miss(_) => "miss",
        }
    }

    /// True for every outcome that passed the threshold gate.
    pub fn passed_threshold(&self) -> bool {
        matches!(self, Self::Eligible(_) | Self::Hit(_) | Self::Miss(_))
    }
}

/// Run-level errors. Per-candidate failures never surface here.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Exclusion store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Listing unavailable at {url}: {source}")]
    ListingUnavailable {
        url: String,
        #[source]
        source: DocumentError,
    },
}

/// Convenience result type.
pub type ScoutResult<T> = Result<T, ScoutError>;
