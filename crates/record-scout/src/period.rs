// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Upload-date window for the catalog query.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// How the search window is chosen.
///
/// A fixed `end` defaults to the current day; a fixed `start` defaults to
/// `end` minus `months` and `days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSettings {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub months: u32,
    pub days: u64,
}

impl Default for PeriodSettings {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            months: 4,
            days: 0,
        }
    }
}

impl PeriodSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(ConfigError::PeriodOrder {
                start: start.to_string(),
                end: end.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// A resolved, inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Resolve `settings` relative to `today`.
    pub fn resolve(settings: &PeriodSettings, today: NaiveDate) -> Result<Self, ConfigError> {
        let end = settings.end.unwrap_or(today);
        let start = match settings.start {
            Some(start) => start,
            None => end
                .checked_sub_months(Months::new(settings.months))
                .and_then(|d| d.checked_sub_days(Days::new(settings.days)))
                .unwrap_or(NaiveDate::MIN),
        };
        if start > end {
            return Err(ConfigError::PeriodOrder {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// `YYYY-MM-DD...YYYY-MM-DD`, the catalog's range syntax.
    pub fn token(&self) -> String {
        format!(
            "{}...{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Catalog query URL for this window.
    pub fn query_url(&self, template: &str) -> String {
        format!("{template}{}", self.token())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}
