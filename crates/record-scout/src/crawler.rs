// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Paginated listing discovery.
//!
//! Walks the catalog page by page, collecting one `Candidate` per listed map
//! and deciding when the listing has ended. End detection, in order:
//!
//! 1. the next control is missing or not interactable
//! 2. the next control is disabled (attribute or `disabled` ancestor class)
//! 3. the page held fewer rows than a full page (heuristic, configurable)
//! 4. after clicking next, neither the URL nor the first row changed in time

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ConfigError, ScoutConfig};
use crate::document::{DocumentError, DocumentResult, Predicate, RemoteDocument};
use crate::progress::{ProgressEmitter, ProgressEventKind};
use crate::types::{Candidate, ScoutError, ScoutResult};

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEnd {
    /// No next control, or it cannot be clicked.
    NextMissing,
    /// The next control is marked disabled.
    NextDisabled,
    /// The page held fewer rows than `full_page_rows`.
    ShortPage(usize),
    /// Clicking next changed neither the URL nor the first row.
    Stalled,
    /// A document call failed mid-crawl.
    Failed,
}

impl std::fmt::Display for PageEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NextMissing => write!(f, "next control missing"),
            Self::NextDisabled => write!(f, "next control disabled"),
            Self::ShortPage(rows) => write!(f, "short page ({rows} rows)"),
            Self::Stalled => write!(f, "page did not change after next"),
            Self::Failed => write!(f, "document error"),
        }
    }
}

/// Result of a crawl.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Deduplicated candidates in discovery order.
    pub candidates: Vec<Candidate>,
    /// Listing pages visited.
    pub pages: u32,
    pub end: PageEnd,
}

/// Walks a paginated listing.
pub struct ListCrawler<'a> {
    config: &'a ScoutConfig,
    base: Url,
}

impl<'a> ListCrawler<'a> {
    pub fn new(config: &'a ScoutConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.base_url).map_err(|e| ConfigError::BaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { config, base })
    }

    /// Crawl from `start_url` and return the discovered candidates.
    pub async fn crawl(
        &self,
        doc: &mut dyn RemoteDocument,
        start_url: &str,
    ) -> ScoutResult<Vec<Candidate>> {
        let outcome = self
            .crawl_with_progress(doc, start_url, &mut ProgressEmitter::default())
            .await?;
        Ok(outcome.candidates)
    }

    /// Crawl from `start_url`, emitting one event per page.
    ///
    /// Only a failed first navigation is an error; anything that goes wrong
    /// later ends the crawl with what was collected so far.
    pub async fn crawl_with_progress(
        &self,
        doc: &mut dyn RemoteDocument,
        start_url: &str,
        progress: &mut ProgressEmitter,
    ) -> ScoutResult<CrawlOutcome> {
        let start = Instant::now();
        doc.goto(start_url, Default::default(), self.config.nav_timeout())
            .await
            .map_err(|source| ScoutError::ListingUnavailable {
                url: start_url.to_string(),
                source,
            })?;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut pages = 0u32;

        let end = loop {
            pages += 1;
            let before = candidates.len();
            let rows = if self.wait_for_rows(doc).await {
                match self.collect_page(doc, &mut seen, &mut candidates).await {
                    Ok(rows) => rows,
                    Err(e) => {
                        warn!("listing page {pages}: reading rows failed: {e}");
                        break PageEnd::Failed;
                    }
                }
            } else {
                0
            };

            debug!("listing page {pages}: {rows} rows, {} candidates", candidates.len());
            progress.emit(ProgressEventKind::PageCrawled {
                page: pages,
                rows,
                new_candidates: candidates.len() - before,
                total_candidates: candidates.len(),
            });

            match self.advance(doc, rows).await {
                Ok(None) => continue,
                Ok(Some(end)) => break end,
                Err(e) => {
                    warn!("listing page {pages}: pagination failed: {e}");
                    break PageEnd::Failed;
                }
            }
        };

        info!(
            "crawl finished: {} candidates over {pages} pages ({end}) in {:.1}s",
            candidates.len(),
            start.elapsed().as_secs_f64()
        );
        progress.emit(ProgressEventKind::CrawlComplete {
            total: candidates.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        });

        Ok(CrawlOutcome {
            candidates,
            pages,
            end,
        })
    }

    /// Wait for listing rows, with one idle-then-retry fallback.
    async fn wait_for_rows(&self, doc: &mut dyn RemoteDocument) -> bool {
        let item = &self.config.listing.item;
        let dom = self.config.dom_timeout();

        let first = doc.wait_for_selector(item, true, dom).await;
        let Err(e) = first else {
            return true;
        };
        debug!("listing rows not visible ({e}), waiting for idle");

        if let Err(e) = doc.wait_for_idle(self.config.nav_timeout()).await {
            debug!("idle wait failed: {e}");
        }
        match doc.wait_for_selector(item, true, dom).await {
            Ok(()) => true,
            Err(e) => {
                warn!("listing rows never became visible: {e}");
                false
            }
        }
    }

    /// Read every row on the current page once. Returns the raw row count.
    async fn collect_page(
        &self,
        doc: &mut dyn RemoteDocument,
        seen: &mut HashSet<String>,
        out: &mut Vec<Candidate>,
    ) -> DocumentResult<usize> {
        let item = &self.config.listing.item;
        let rows = doc.count(item).await?;

        for i in 0..rows {
            let name = doc
                .text(item, i)
                .await?
                .map(|t| t.trim().to_string())
                .unwrap_or_default();
            let href = doc
                .attribute(item, i, "href")
                .await?
                .map(|h| h.trim().to_string())
                .unwrap_or_default();

            if name.is_empty() || href.is_empty() {
                debug!("skipping malformed row {i} (name={name:?}, href={href:?})");
                continue;
            }
            let Some(link) = self.resolve(&href) else {
                debug!("skipping row {i}: unresolvable link {href:?}");
                continue;
            };
            if seen.insert(link.clone()) {
                out.push(Candidate::new(name, link));
            }
        }
        Ok(rows)
    }

    /// Move to the next page. `Ok(None)` means the page changed.
    async fn advance(
        &self,
        doc: &mut dyn RemoteDocument,
        rows: usize,
    ) -> DocumentResult<Option<PageEnd>> {
        let listing = &self.config.listing;
        let next = &listing.next;

        if doc.count(next).await? == 0 || !doc.is_visible(next, 0).await? {
            return Ok(Some(PageEnd::NextMissing));
        }
        if !doc.is_enabled(next, 0).await?
            || doc
                .has_ancestor_class(next, 0, &listing.disabled_class)
                .await?
        {
            return Ok(Some(PageEnd::NextDisabled));
        }
        let full = self.config.full_page_rows;
        if full > 0 && rows < full {
            return Ok(Some(PageEnd::ShortPage(rows)));
        }

        let url = doc.current_url().await?;
        let first_link = doc.attribute(&listing.item, 0, "href").await?;
        doc.click(next, 0).await?;

        let changed = Predicate::UrlOrAttributeChanged {
            url,
            locator: listing.item.clone(),
            attribute: "href".to_string(),
            value: first_link,
        };
        match doc.wait_for(&changed, self.config.nav_timeout()).await {
            Ok(()) => Ok(None),
            Err(DocumentError::Timeout(_)) => Ok(Some(PageEnd::Stalled)),
            Err(e) => Err(e),
        }
    }

    /// Resolve a possibly relative link against the base origin.
    pub fn resolve(&self, href: &str) -> Option<String> {
        self.base.join(href).ok().map(|u| u.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let config = ScoutConfig {
            base_url: "https://trackmania.exchange".to_string(),
            ..ScoutConfig::default()
        };
        let crawler = ListCrawler::new(&config).unwrap();
        assert_eq!(
            crawler.resolve("/mapshow/123").as_deref(),
            Some("https://trackmania.exchange/mapshow/123")
        );
        assert_eq!(
            crawler.resolve("https://other.example/x").as_deref(),
            Some("https://other.example/x")
        );
    }

    #[test]
    fn test_page_end_display() {
        assert_eq!(PageEnd::ShortPage(10).to_string(), "short page (10 rows)");
        assert_eq!(PageEnd::Stalled.to_string(), "page did not change after next");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ScoutConfig {
            base_url: "::".to_string(),
            ..ScoutConfig::default()
        };
        assert!(ListCrawler::new(&config).is_err());
    }
}
