// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration resolution for the CLI.
//!
//! Order: `--config PATH`, then `RECORD_SCOUT_CONFIG`, then
//! `./record-scout.json`, then built-in defaults. Command-line flags are
//! applied on top, and the result is validated before use.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use record_scout::config::ScoutConfig;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "RECORD_SCOUT_CONFIG";

/// Config file picked up from the working directory.
pub const LOCAL_CONFIG: &str = "record-scout.json";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    Local(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Env(p) | Self::Local(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Env(p) => write!(f, "{} (${CONFIG_ENV})", p.display()),
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Pick the config file to use.
///
/// Explicit and environment paths are returned even if missing so loading
/// reports the error; the local file is only used when it exists.
pub fn locate(explicit: Option<&Path>, env: Option<&str>, cwd: &Path) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Flag(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.trim().is_empty()) {
        return ConfigSource::Env(PathBuf::from(path));
    }
    let local = cwd.join(LOCAL_CONFIG);
    if local.is_file() {
        return ConfigSource::Local(local);
    }
    ConfigSource::Defaults
}

/// Load the configuration from `source` (no overrides, no validation).
pub fn load_from(source: &ConfigSource) -> Result<ScoutConfig> {
    match source.path() {
        Some(path) => ScoutConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {source}")),
        None => Ok(ScoutConfig::default()),
    }
}

/// Locate and load the configuration for this process.
pub fn load(explicit: Option<&Path>) -> Result<(ScoutConfig, ConfigSource)> {
    let env = std::env::var(CONFIG_ENV).ok();
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let source = locate(explicit, env.as_deref(), &cwd);
    let config = load_from(&source)?;
    Ok((config, source))
}

/// Per-run values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tracked: Option<String>,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub months: Option<u32>,
    pub days: Option<u64>,
    pub exclusions: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub max_expansions: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut ScoutConfig) {
        if let Some(tracked) = &self.tracked {
            config.tracked_identity = tracked.clone();
        }
        if let Some(min) = self.min {
            config.min_signal = min;
        }
        if let Some(max) = self.max {
            config.max_signal = max;
        }
        if self.start.is_some() {
            config.period.start = self.start;
        }
        if self.end.is_some() {
            config.period.end = self.end;
        }
        if let Some(months) = self.months {
            config.period.months = months;
        }
        if let Some(days) = self.days {
            config.period.days = days;
        }
        if let Some(path) = &self.exclusions {
            config.exclusion_file = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(n) = self.max_expansions {
            config.max_expansions = n;
        }
    }
}
