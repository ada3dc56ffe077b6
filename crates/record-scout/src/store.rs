// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Persistent exclusion list.
//!
//! Features:
//! - Plain UTF-8 file, one case-folded identity per line, no header
//! - Append-only: entries are never rewritten or removed
//! - The in-memory set is updated only after a line was written, so a second
//!   append of the same identity in one run is a no-op

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::fold_identity;

/// Failure to persist one identity.
#[derive(thiserror::Error, Debug)]
#[error("failed to append {identity:?} to {path}: {source}")]
pub struct StoreError {
    pub identity: String,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Case-insensitive set of identities to skip, backed by a flat file.
#[derive(Debug)]
pub struct ExclusionStore {
    path: PathBuf,
    entries: HashSet<String>,
}

impl ExclusionStore {
    /// Load the list at `path`.
    ///
    /// An unreadable or missing file yields an empty store; the file is
    /// created on the first append.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => parse_entries(&raw),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        "exclusion list {} unreadable, starting empty: {e}",
                        path.display()
                    );
                }
                HashSet::new()
            }
        };
        tracing::debug!("loaded {} exclusions from {}", entries.len(), path.display());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains(&fold_identity(identity))
    }

    /// Persist `identity` unless it is already listed.
    ///
    /// Returns `Ok(true)` if a line was written, `Ok(false)` if the identity was
    /// already present (or folds to nothing).
    pub fn append(&mut self, identity: &str) -> Result<bool, StoreError> {
        let folded = fold_identity(identity);
        if folded.is_empty() || self.entries.contains(&folded) {
            return Ok(false);
        }

        self.write_line(&folded).map_err(|source| StoreError {
            identity: folded.clone(),
            path: self.path.clone(),
            source,
        })?;
        self.entries.insert(folded);
        Ok(true)
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        file.flush()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in lexical order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        all.sort_unstable();
        all
    }
}

fn parse_entries(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(fold_identity)
        .filter(|line| !line.is_empty())
        .collect()
}
