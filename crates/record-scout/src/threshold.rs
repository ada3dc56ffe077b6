// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Record-count gate.
//!
//! Opens each candidate's detail page, reads the record counter, and sorts
//! the candidate into blocked / too low / eligible. Candidates above the
//! maximum are written to the exclusion list so later runs skip them.

use tracing::{debug, warn};
use url::Url;

use crate::config::ScoutConfig;
use crate::document::{DocumentError, Locator, RemoteDocument};
use crate::store::ExclusionStore;
use crate::types::{Candidate, EnrichedCandidate, Outcome, TechnicalCode};

/// Parse a record counter.
///
/// Ordinary, non-breaking and narrow non-breaking spaces are removed (they
/// appear as thousands separators). Anything else that is not an ASCII digit
/// rejects the text, so abbreviated counts like `52k` yield `None`.
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{00A0}' | '\u{202F}'))
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// One place the record counter can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalSource {
    /// Short-format label nested in the counter control.
    ShortLabel(Locator),
    /// The counter control's own text.
    ControlText(Locator),
    /// A control matched by accessible role and name.
    Fallback(Locator),
}

impl SignalSource {
    pub fn locator(&self) -> &Locator {
        match self {
            Self::ShortLabel(l) | Self::ControlText(l) | Self::Fallback(l) => l,
        }
    }
}

/// Classifies candidates by record count.
pub struct ThresholdFilter<'a> {
    config: &'a ScoutConfig,
    sources: Vec<SignalSource>,
}

impl<'a> ThresholdFilter<'a> {
    pub fn new(config: &'a ScoutConfig) -> Self {
        let detail = &config.detail;
        let sources = vec![
            SignalSource::ShortLabel(detail.counter.descendant(&detail.counter_short_label)),
            SignalSource::ControlText(detail.counter.clone()),
            SignalSource::Fallback(detail.counter_fallback.clone()),
        ];
        Self { config, sources }
    }

    /// Extraction sources in precedence order.
    pub fn sources(&self) -> &[SignalSource] {
        &self.sources
    }

    /// Classify one candidate. Never fails: problems become technical exclusions.
    pub async fn classify(
        &self,
        doc: &mut dyn RemoteDocument,
        store: &mut ExclusionStore,
        candidate: &Candidate,
    ) -> Outcome {
        if let Err(e) = doc
            .goto(&candidate.link, Default::default(), self.config.nav_timeout())
            .await
        {
            let code = match e {
                DocumentError::Timeout(_) => TechnicalCode::NavTimeout,
                _ => TechnicalCode::NavError,
            };
            return Outcome::technical(candidate, code, e.to_string());
        }

        // The counter may render late; a missing counter only means the
        // fallback source has to answer.
        if let Err(e) = doc
            .wait_for_selector(&self.config.detail.counter, false, self.config.dom_timeout())
            .await
        {
            debug!("{}: counter not found ({e})", candidate.identity);
        }

        let Some(signal) = self.extract_signal(doc).await else {
            return Outcome::technical(
                candidate,
                TechnicalCode::NoSignalFound,
                "no numeric record counter on detail page",
            );
        };
        debug!("{}: {signal} records", candidate.identity);

        if signal > self.config.max_signal {
            return match store.append(&candidate.identity) {
                Ok(written) => {
                    if written {
                        debug!("{}: added to exclusion list", candidate.identity);
                    }
                    Outcome::Blocked {
                        candidate: candidate.clone(),
                        signal,
                    }
                }
                Err(e) => {
                    warn!("{e}");
                    Outcome::technical(
                        candidate,
                        TechnicalCode::StoreWriteError,
                        format!("{signal} records: {e}"),
                    )
                }
            };
        }
        if signal < self.config.min_signal {
            return Outcome::TooLow {
                candidate: candidate.clone(),
                signal,
            };
        }

        match self.find_secondary_link(doc).await {
            Some(secondary_link) => Outcome::Eligible(EnrichedCandidate {
                candidate: candidate.clone(),
                signal,
                secondary_link,
            }),
            None => Outcome::technical(
                candidate,
                TechnicalCode::NoSecondaryLink,
                format!("{signal} records but no leaderboard link"),
            ),
        }
    }

    /// Try each source in order; the first numeric value wins.
    pub async fn extract_signal(&self, doc: &dyn RemoteDocument) -> Option<u64> {
        for source in &self.sources {
            if let Some(value) = read_source(doc, source).await {
                return Some(value);
            }
        }
        None
    }

    /// First secondary-link strategy with a non-empty `href`, as an absolute URL.
    ///
    /// Relative links resolve against the detail page, or against the base
    /// origin when the page URL is unusable.
    async fn find_secondary_link(&self, doc: &dyn RemoteDocument) -> Option<String> {
        let page = match doc.current_url().await {
            Ok(url) => Url::parse(&url).ok().filter(|u| u.has_host()),
            Err(e) => {
                debug!("current url unavailable: {e}");
                None
            }
        };
        let base = page.or_else(|| Url::parse(&self.config.base_url).ok());

        for locator in &self.config.detail.secondary_links {
            match doc.attribute(locator, 0, "href").await {
                Ok(Some(href)) if !href.trim().is_empty() => {
                    match resolve_link(base.as_ref(), href.trim()) {
                        Some(link) => return Some(link),
                        None => debug!("secondary link {locator}: unresolvable {href:?}"),
                    }
                }
                Ok(_) => {}
                Err(e) => debug!("secondary link {locator}: {e}"),
            }
        }
        None
    }
}

/// Join `href` onto `base`. Without a base only absolute links survive.
fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    let url = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    url.ok().map(|u| u.to_string())
}

async fn read_source(doc: &dyn RemoteDocument, source: &SignalSource) -> Option<u64> {
    let locator = source.locator();
    match doc.text(locator, 0).await {
        Ok(Some(text)) => {
            let value = parse_count(&text);
            if value.is_none() {
                debug!("{source:?}: non-numeric counter {text:?}");
            }
            value
        }
        Ok(None) => None,
        Err(e) => {
            debug!("{source:?}: {e}");
            None
        }
    }
}
