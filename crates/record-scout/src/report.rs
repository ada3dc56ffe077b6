// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run report.
//!
//! Partitions every discovered candidate into fixed, ordered sections and
//! renders them as a plain-text document (or JSON). The report is written
//! once, through a temporary sibling file, so a reader never sees a partial
//! report.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{Candidate, EnrichedCandidate, Outcome, ScoutResult, TechnicalCode};

/// Why a candidate failed the record-count gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdReason {
    TooLow,
    TooHigh,
}

impl std::fmt::Display for ThresholdReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLow => write!(f, "<min"),
            Self::TooHigh => write!(f, ">max"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRecord {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub signal: u64,
    pub reason: ThresholdReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalRecord {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub code: TechnicalCode,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleRecord {
    #[serde(flatten)]
    pub enriched: EnrichedCandidate,
    /// `None` when the leaderboard was never searched.
    pub found: Option<bool>,
}

/// Run metadata printed above the sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub tracked: String,
    pub period: Option<String>,
    pub generated_at: String,
    pub elapsed_secs: f64,
}

impl ReportHeader {
    pub fn new(tracked: impl Into<String>, period: Option<String>) -> Self {
        Self {
            tracked: tracked.into(),
            period,
            generated_at: chrono::Utc::now().to_rfc3339(),
            elapsed_secs: 0.0,
        }
    }
}

/// Report sections in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Discovered,
    ExcludedByList,
    ThresholdExcluded,
    Technical,
    Eligible,
    Hits,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Discovered,
        Section::ExcludedByList,
        Section::ThresholdExcluded,
        Section::Technical,
        Section::Eligible,
        Section::Hits,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Discovered => "DISCOVERED MAPS",
            Self::ExcludedByList => "EXCLUDED BY BLACKLIST",
            Self::ThresholdExcluded => "EXCLUDED BY RECORD COUNT",
            Self::Technical => "TECHNICAL EXCLUSIONS",
            Self::Eligible => "ELIGIBLE MAPS",
            Self::Hits => "MAPS WITH TRACKED PLAYER",
        }
    }
}

/// The full result of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub header: ReportHeader,
    pub discovered: Vec<Candidate>,
    pub excluded_by_list: Vec<Candidate>,
    pub threshold_excluded: Vec<ThresholdRecord>,
    pub technical: Vec<TechnicalRecord>,
    pub eligible: Vec<EligibleRecord>,
    pub hits: Vec<EnrichedCandidate>,
}

/// Builds a `Report` from the stage outputs.
pub struct ReportAggregator {
    header: ReportHeader,
}

impl ReportAggregator {
    pub fn new(header: ReportHeader) -> Self {
        Self { header }
    }

    /// Partition `outcomes` into sections.
    ///
    /// `excluded_by_list` are the candidates skipped before classification;
    /// `outcomes` holds one entry per candidate that was classified.
    pub fn build(
        self,
        discovered: &[Candidate],
        excluded_by_list: &[Candidate],
        outcomes: &[Outcome],
    ) -> Report {
        let mut threshold_excluded = Vec::new();
        let mut technical = Vec::new();
        let mut eligible = Vec::new();
        let mut hits = Vec::new();

        for outcome in outcomes {
            match outcome {
                Outcome::Blocked { candidate, signal } => threshold_excluded.push(ThresholdRecord {
                    candidate: candidate.clone(),
                    signal: *signal,
                    reason: ThresholdReason::TooHigh,
                }),
                Outcome::TooLow { candidate, signal } => threshold_excluded.push(ThresholdRecord {
                    candidate: candidate.clone(),
                    signal: *signal,
                    reason: ThresholdReason::TooLow,
                }),
                Outcome::TechnicalExclusion {
                    candidate,
                    code,
                    detail,
                } => technical.push(TechnicalRecord {
                    candidate: candidate.clone(),
                    code: *code,
                    detail: detail.clone(),
                }),
                Outcome::Eligible(e) => eligible.push(EligibleRecord {
                    enriched: e.clone(),
                    found: None,
                }),
                Outcome::Hit(e) => {
                    eligible.push(EligibleRecord {
                        enriched: e.clone(),
                        found: Some(true),
                    });
                    hits.push(e.clone());
                }
                Outcome::Miss(e) => eligible.push(EligibleRecord {
                    enriched: e.clone(),
                    found: Some(false),
                }),
            }
        }

        // Stable sort: equal keys keep arrival order.
        threshold_excluded.sort_by_key(|r| (r.reason, r.signal));

        let report = Report {
            header: self.header,
            discovered: discovered.to_vec(),
            excluded_by_list: excluded_by_list.to_vec(),
            threshold_excluded,
            technical,
            eligible,
            hits,
        };
        if !report.is_partitioned() {
            tracing::warn!(
                "report sections do not partition the {} discovered candidates",
                report.discovered.len()
            );
        }
        report
    }
}

impl Report {
    pub fn set_elapsed(&mut self, elapsed_secs: f64) {
        self.header.elapsed_secs = elapsed_secs;
    }

    /// Number of records in a section.
    pub fn count(&self, section: Section) -> usize {
        match section {
            Section::Discovered => self.discovered.len(),
            Section::ExcludedByList => self.excluded_by_list.len(),
            Section::ThresholdExcluded => self.threshold_excluded.len(),
            Section::Technical => self.technical.len(),
            Section::Eligible => self.eligible.len(),
            Section::Hits => self.hits.len(),
        }
    }

    /// True when the exclusion, technical and eligible sections are pairwise
    /// disjoint and together cover exactly the discovered candidates.
    pub fn is_partitioned(&self) -> bool {
        let buckets: Vec<&str> = self
            .excluded_by_list
            .iter()
            .map(|c| c.link.as_str())
            .chain(self.threshold_excluded.iter().map(|r| r.candidate.link.as_str()))
            .chain(self.technical.iter().map(|r| r.candidate.link.as_str()))
            .chain(self.eligible.iter().map(|r| r.enriched.candidate.link.as_str()))
            .collect();
        let unique: HashSet<&str> = buckets.iter().copied().collect();
        let discovered: HashSet<&str> = self.discovered.iter().map(|c| c.link.as_str()).collect();

        unique.len() == buckets.len()
            && buckets.len() == self.discovered.len()
            && unique == discovered
    }

    /// Render the plain-text report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let h = &self.header;
        let _ = writeln!(out, "Record scout report");
        let _ = writeln!(out, "Tracked player : {}", h.tracked);
        if let Some(period) = &h.period {
            let _ = writeln!(out, "Period         : {period}");
        }
        let _ = writeln!(out, "Generated      : {}", h.generated_at);
        let _ = writeln!(out, "Elapsed        : {:.2} s", h.elapsed_secs);
        for section in Section::ALL {
            let _ = writeln!(out, "{:<26} : {}", section.title(), self.count(section));
        }

        for section in Section::ALL {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "==================== {} ({}) ====================",
                section.title(),
                self.count(section)
            );
            let _ = writeln!(out);
            for block in self.blocks(section) {
                out.push_str(&block);
                out.push('\n');
            }
        }
        out
    }

    fn blocks(&self, section: Section) -> Vec<String> {
        match section {
            Section::Discovered => self
                .discovered
                .iter()
                .map(|c| candidate_block(c, None, None))
                .collect(),
            Section::ExcludedByList => self
                .excluded_by_list
                .iter()
                .map(|c| candidate_block(c, None, Some("blacklisted".to_string())))
                .collect(),
            Section::ThresholdExcluded => self
                .threshold_excluded
                .iter()
                .map(|r| candidate_block(&r.candidate, Some(r.signal), Some(r.reason.to_string())))
                .collect(),
            Section::Technical => self
                .technical
                .iter()
                .map(|r| {
                    candidate_block(&r.candidate, None, Some(format!("{}: {}", r.code, r.detail)))
                })
                .collect(),
            Section::Eligible => self
                .eligible
                .iter()
                .map(|r| enriched_block(&r.enriched))
                .collect(),
            Section::Hits => self.hits.iter().map(enriched_block).collect(),
        }
    }

    pub fn to_json(&self) -> ScoutResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the text report to `path` atomically.
    pub fn write_to(&self, path: &Path) -> ScoutResult<()> {
        write_atomic(path, self.render_text().as_bytes())
    }

    /// `{tracked}_{period}.txt` inside `dir`.
    pub fn default_path(&self, dir: &Path) -> PathBuf {
        let stem = match &self.header.period {
            Some(period) => format!("{}_{period}", self.header.tracked),
            None => self.header.tracked.clone(),
        };
        dir.join(format!("{}.txt", sanitize_file_stem(&stem)))
    }
}

fn candidate_block(candidate: &Candidate, signal: Option<u64>, reason: Option<String>) -> String {
    let mut block = format!("Name        : {}\n", candidate.identity);
    if let Some(signal) = signal {
        let _ = writeln!(block, "Records     : {signal}");
    }
    let _ = writeln!(block, "Map         : {}", candidate.link);
    if let Some(reason) = reason {
        let _ = writeln!(block, "Reason      : {reason}");
    }
    block
}

fn enriched_block(e: &EnrichedCandidate) -> String {
    format!(
        "Name        : {}\nRecords     : {}\nMap         : {}\nLeaderboard : {}\n",
        e.candidate.identity, e.signal, e.candidate.link, e.secondary_link
    )
}

/// Replace characters that are unsafe in file names.
fn sanitize_file_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> ScoutResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("report.txt");
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
