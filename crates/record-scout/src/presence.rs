// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Leaderboard presence search.
//!
//! Opens a leaderboard, expands it with a bounded number of "load more"
//! clicks, then scans the player cells for the tracked identity.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::LeaderboardSelectors;
use crate::document::{DocumentError, Predicate, RemoteDocument};
use crate::types::TechnicalCode;

/// Why a leaderboard could not be searched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("leaderboard navigation failed: {0}")]
    Navigation(DocumentError),

    #[error("leaderboard rows never appeared: {0}")]
    Timeout(DocumentError),

    #[error("leaderboard scan failed: {0}")]
    Scan(DocumentError),
}

impl SearchError {
    /// Technical code recorded for a candidate whose search failed.
    pub fn code(&self) -> TechnicalCode {
        match self {
            Self::Timeout(_) => TechnicalCode::SearchTimeout,
            Self::Navigation(DocumentError::Timeout(_)) => TechnicalCode::SearchTimeout,
            Self::Navigation(_) | Self::Scan(_) => TechnicalCode::SearchError,
        }
    }
}

/// Collapse runs of whitespace, trim, and case-fold.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Searches leaderboards for a player.
pub struct PresenceSearcher<'a> {
    selectors: &'a LeaderboardSelectors,
    dom_timeout: Duration,
    nav_timeout: Duration,
}

impl<'a> PresenceSearcher<'a> {
    pub fn new(
        selectors: &'a LeaderboardSelectors,
        dom_timeout: Duration,
        nav_timeout: Duration,
    ) -> Self {
        Self {
            selectors,
            dom_timeout,
            nav_timeout,
        }
    }

    /// True if any player cell contains `tracked` (case-insensitive).
    pub async fn search(
        &self,
        doc: &mut dyn RemoteDocument,
        secondary_link: &str,
        tracked: &str,
        max_expansions: u32,
    ) -> Result<bool, SearchError> {
        doc.goto(secondary_link, Default::default(), self.nav_timeout)
            .await
            .map_err(SearchError::Navigation)?;

        doc.wait_for_selector(&self.selectors.row, true, self.dom_timeout)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(e)
                } else {
                    SearchError::Scan(e)
                }
            })?;

        let expansions = self.expand(doc, max_expansions).await;
        debug!("{secondary_link}: {expansions} expansions");

        self.scan(doc, tracked).await.map_err(SearchError::Scan)
    }

    /// Click "load more" until it disappears, stops adding rows, or the
    /// budget runs out. Returns the number of successful expansions.
    async fn expand(&self, doc: &mut dyn RemoteDocument, max_expansions: u32) -> u32 {
        let mut done = 0;
        while done < max_expansions {
            match self.expand_once(doc).await {
                Ok(true) => done += 1,
                Ok(false) => break,
                Err(e) => {
                    warn!("load more failed, keeping partial leaderboard: {e}");
                    break;
                }
            }
        }
        done
    }

    /// One "load more" round. `Ok(false)` means expansion should stop.
    async fn expand_once(&self, doc: &mut dyn RemoteDocument) -> Result<bool, DocumentError> {
        let more = &self.selectors.load_more;
        if doc.count(more).await? == 0
            || !doc.is_visible(more, 0).await?
            || !doc.is_enabled(more, 0).await?
        {
            return Ok(false);
        }

        let rows = doc.count(&self.selectors.row).await?;
        doc.scroll_to_bottom().await?;
        doc.click(more, 0).await?;

        let grown = Predicate::CountAbove {
            locator: self.selectors.row.clone(),
            count: rows,
        };
        match doc.wait_for(&grown, self.dom_timeout).await {
            Ok(()) => Ok(true),
            Err(DocumentError::Timeout(_)) => {
                debug!("row count stayed at {rows} after load more");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn scan(&self, doc: &dyn RemoteDocument, tracked: &str) -> Result<bool, DocumentError> {
        let needle = normalize(tracked);
        let cell = &self.selectors.identity_cell;
        let cells = doc.count(cell).await?;

        for i in 0..cells {
            let Some(text) = doc.text(cell, i).await? else {
                continue;
            };
            if normalize(&text).contains(&needle) {
                debug!("tracked identity found in row {i}");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  misspleaSE  "), "missplease");
        assert_eq!(normalize("Miss \n\t Please"), "miss please");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let needle = normalize("MissPlease");
        assert!(normalize("  misspleaSE  ").contains(&needle));
        assert!(normalize("[TEAM] MissPlease_alt").contains(&needle));
        assert!(!normalize("Miss Please").contains(&needle));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SearchError::Timeout(DocumentError::Timeout(10)).code(),
            TechnicalCode::SearchTimeout
        );
        assert_eq!(
            SearchError::Navigation(DocumentError::Timeout(10)).code(),
            TechnicalCode::SearchTimeout
        );
        assert_eq!(
            SearchError::Navigation(DocumentError::Navigation("dns".into())).code(),
            TechnicalCode::SearchError
        );
        assert_eq!(
            SearchError::Scan(DocumentError::Closed).code(),
            TechnicalCode::SearchError
        );
    }
}
