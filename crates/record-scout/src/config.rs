// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run configuration: thresholds, timeouts, paths, and page selectors.
//!
//! Every field has a default so a partial JSON file only needs to name what
//! it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::Locator;
use crate::period::PeriodSettings;

/// Catalog search URL; the period token is appended verbatim.
pub const DEFAULT_SEARCH_URL: &str = "https://trackmania.exchange/mapsearch?query=+++tags%3A+!4%2C!5%2C!6%2C!8%2C!11%2C!23%2C!24%2C!25%2C!30%2C!34%2C!40%2C!41%2C!42%2C!44%2C!45%2C!46%2C!47%2C!48%2C!49%2C!50%2C!52%2C!53%2C!54%2C!55%2C!56%2C!57%2C!58%2C!59%2C!61%2C!62%2C!63%2C!64%2C!65%2C!66%2C!67+length%3A+0h0m38s...0h1m05s+in%3A+!totd+uploaded%3A+";

/// Origin that relative listing links are resolved against.
pub const DEFAULT_BASE_URL: &str = "https://trackmania.exchange";

pub const DEFAULT_MIN_RECORDS: u64 = 50;
pub const DEFAULT_MAX_RECORDS: u64 = 300;
pub const DEFAULT_TRACKED: &str = "MissPlease";
pub const DEFAULT_EXCLUSION_FILE: &str = "forbidden_maps.txt";

/// Rows on a full listing page. Unverified: the catalog does not document it.
pub const DEFAULT_FULL_PAGE_ROWS: usize = 40;

pub const DEFAULT_MAX_EXPANSIONS: u32 = 10;
pub const DEFAULT_DOM_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;

/// Invalid configuration values.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("min threshold ({min}) must be lower than max threshold ({max})")]
    ThresholdOrder { min: u64, max: u64 },

    #[error("tracked identity must not be empty")]
    EmptyTracked,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("invalid base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("period start {start} is after end {end}")]
    PeriodOrder { start: String, end: String },

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Selectors for the catalog listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One element per listed item; its text is the name, `href` the link.
    pub item: Locator,
    /// The "next page" control.
    pub next: Locator,
    /// Ancestor class that marks the next control as disabled.
    pub disabled_class: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            item: Locator::css("div.map-list-item a.map-name"),
            next: Locator::css("ul.pagination li.page-next a"),
            disabled_class: "disabled".to_string(),
        }
    }
}

/// Selectors for a map's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    /// Control holding the record counter.
    pub counter: Locator,
    /// Short-format label nested inside `counter`.
    pub counter_short_label: String,
    /// Fallback counter matched by accessible role and name.
    pub counter_fallback: Locator,
    /// Leaderboard link strategies, tried in order.
    pub secondary_links: Vec<Locator>,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            counter: Locator::css("button#tab-records"),
            counter_short_label: "span.count-short".to_string(),
            counter_fallback: Locator::role("tab", "Records"),
            secondary_links: vec![
                Locator::css("a[href*='trackmania.io/#/leaderboard']"),
                Locator::css("a[href*='trackmania.io']"),
            ],
        }
    }
}

/// Selectors for the leaderboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardSelectors {
    /// One element per leaderboard row.
    pub row: Locator,
    /// The player cell of each row.
    pub identity_cell: Locator,
    /// The "load more" control.
    pub load_more: Locator,
}

impl Default for LeaderboardSelectors {
    fn default() -> Self {
        Self {
            row: Locator::css("table.leaderboard tbody tr"),
            identity_cell: Locator::css("table.leaderboard tbody tr td.player-name"),
            load_more: Locator::css("button.load-more"),
        }
    }
}

/// Full run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub search_url_template: String,
    pub base_url: String,
    pub tracked_identity: String,
    /// Lowest eligible record count (inclusive).
    pub min_signal: u64,
    /// Highest eligible record count (inclusive).
    pub max_signal: u64,
    /// Pages with fewer rows are treated as the last page. `0` disables the check.
    pub full_page_rows: usize,
    /// Upper bound on "load more" clicks per leaderboard.
    pub max_expansions: u32,
    pub dom_timeout_ms: u64,
    pub nav_timeout_ms: u64,
    pub exclusion_file: PathBuf,
    pub output_dir: PathBuf,
    pub period: PeriodSettings,
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
    pub leaderboard: LeaderboardSelectors,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            search_url_template: DEFAULT_SEARCH_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            tracked_identity: DEFAULT_TRACKED.to_string(),
            min_signal: DEFAULT_MIN_RECORDS,
            max_signal: DEFAULT_MAX_RECORDS,
            full_page_rows: DEFAULT_FULL_PAGE_ROWS,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            dom_timeout_ms: DEFAULT_DOM_TIMEOUT_MS,
            nav_timeout_ms: DEFAULT_NAV_TIMEOUT_MS,
            exclusion_file: PathBuf::from(DEFAULT_EXCLUSION_FILE),
            output_dir: PathBuf::from("."),
            period: PeriodSettings::default(),
            listing: ListingSelectors::default(),
            detail: DetailSelectors::default(),
            leaderboard: LeaderboardSelectors::default(),
        }
    }
}

impl ScoutConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the preconditions the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_signal >= self.max_signal {
            return Err(ConfigError::ThresholdOrder {
                min: self.min_signal,
                max: self.max_signal,
            });
        }
        if self.tracked_identity.trim().is_empty() {
            return Err(ConfigError::EmptyTracked);
        }
        if self.dom_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("dom_timeout_ms"));
        }
        if self.nav_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("nav_timeout_ms"));
        }
        url::Url::parse(&self.base_url).map_err(|e| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        self.period.validate()?;
        Ok(())
    }

    pub fn dom_timeout(&self) -> Duration {
        Duration::from_millis(self.dom_timeout_ms)
    }

    pub fn nav_timeout(&self) -> Duration {
        Duration::from_millis(self.nav_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScoutConfig::default();
        config.validate().unwrap();
        assert_eq!(config.min_signal, 50);
        assert_eq!(config.max_signal, 300);
        assert_eq!(config.full_page_rows, 40);
    }

    #[test]
    fn test_threshold_order_rejected() {
        let config = ScoutConfig {
            min_signal: 300,
            max_signal: 300,
            ..ScoutConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { min: 300, max: 300 })
        ));
    }

    #[test]
    fn test_empty_tracked_rejected() {
        let config = ScoutConfig {
            tracked_identity: "   ".to_string(),
            ..ScoutConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTracked)));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let config = ScoutConfig {
            base_url: "not a url".to_string(),
            ..ScoutConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BaseUrl { .. })));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.json");
        std::fs::write(
            &path,
            r##"{
                "tracked_identity": "Someone",
                "max_signal": 500,
                "leaderboard": { "load_more": { "kind": "css", "selector": "#more" } }
            }"##,
        )
        .unwrap();

        let config = ScoutConfig::from_file(&path).unwrap();
        assert_eq!(config.tracked_identity, "Someone");
        assert_eq!(config.max_signal, 500);
        assert_eq!(config.min_signal, DEFAULT_MIN_RECORDS);
        assert_eq!(config.leaderboard.load_more, Locator::css("#more"));
        assert_eq!(config.leaderboard.row, LeaderboardSelectors::default().row);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ScoutConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
