// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Record Scout: catalog crawling, record-count gating, and leaderboard
//! presence search over an abstract remote document.

pub mod config;
pub mod crawler;
pub mod document;
pub mod period;
pub mod pipeline;
pub mod presence;
pub mod progress;
pub mod report;
pub mod store;
pub mod threshold;
pub mod types;

pub use config::{ConfigError, ScoutConfig};
pub use crawler::{CrawlOutcome, ListCrawler, PageEnd};
pub use document::{DocumentError, DocumentResult, Locator, Predicate, RemoteDocument, WaitPolicy};
pub use period::{Period, PeriodSettings};
pub use pipeline::Pipeline;
pub use presence::{PresenceSearcher, SearchError};
pub use report::{Report, ReportAggregator, ReportHeader, Section};
pub use store::{ExclusionStore, StoreError};
pub use threshold::{parse_count, ThresholdFilter};
pub use types::*;
