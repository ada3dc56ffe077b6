// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scripted in-memory `RemoteDocument` shared by the integration tests.
//!
//! Pages are keyed by URL. Each page holds elements per `Locator` and a queue
//! of click actions per locator. Waits never sleep: a predicate that does not
//! hold right away is reported as a timeout.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use record_scout::config::ScoutConfig;
use record_scout::document::{
    DocumentError, DocumentResult, Locator, Predicate, RemoteDocument, WaitPolicy,
};

// ── Elements and pages ──

#[derive(Debug, Clone)]
pub struct MockElement {
    pub text: Option<String>,
    pub attrs: HashMap<String, String>,
    pub visible: bool,
    pub enabled: bool,
    /// Classes carried by the element or any ancestor.
    pub classes: Vec<String>,
}

impl MockElement {
    pub fn new() -> Self {
        Self {
            text: None,
            attrs: HashMap::new(),
            visible: true,
            enabled: true,
            classes: Vec::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new().with_text(text)
    }

    pub fn link(text: &str, href: &str) -> Self {
        Self::new().with_text(text).with_attr("href", href)
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_ancestor_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub enum ClickAction {
    /// Load another page, as a link would.
    Navigate(String),
    /// Append elements to the current page.
    Append(Vec<(Locator, MockElement)>),
    /// Nothing happens.
    Nothing,
}

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub elements: HashMap<Locator, Vec<MockElement>>,
    /// Consumed front to back; once empty, clicks do nothing.
    pub on_click: HashMap<Locator, Vec<ClickAction>>,
    /// Elements that only render once the page has gone idle.
    pub after_idle: Vec<(Locator, MockElement)>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: &Locator, element: MockElement) -> Self {
        self.elements
            .entry(locator.clone())
            .or_default()
            .push(element);
        self
    }

    pub fn with_all(mut self, locator: &Locator, elements: Vec<MockElement>) -> Self {
        self.elements
            .entry(locator.clone())
            .or_default()
            .extend(elements);
        self
    }

    pub fn on_click(mut self, locator: &Locator, action: ClickAction) -> Self {
        self.on_click
            .entry(locator.clone())
            .or_default()
            .push(action);
        self
    }

    /// Render `elements` under `locator` on the first `wait_for_idle`.
    pub fn after_idle(mut self, locator: &Locator, elements: Vec<MockElement>) -> Self {
        self.after_idle
            .extend(elements.into_iter().map(|e| (locator.clone(), e)));
        self
    }

    fn get(&self, locator: &Locator, index: usize) -> Option<&MockElement> {
        self.elements.get(locator).and_then(|v| v.get(index))
    }

    fn count(&self, locator: &Locator) -> usize {
        self.elements.get(locator).map_or(0, Vec::len)
    }
}

// ── Document ──

#[derive(Debug, Default)]
pub struct MockDocument {
    pages: HashMap<String, MockPage>,
    failures: HashMap<String, DocumentError>,
    current_url: Option<String>,
    current: MockPage,
    /// Every URL passed to `goto`, in order.
    pub visits: Vec<String>,
    /// Number of successful clicks per locator.
    pub clicks: HashMap<Locator, usize>,
    pub scrolls: usize,
    pub idle_waits: usize,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Make every `goto(url)` fail with `error`.
    pub fn fail(mut self, url: &str, error: DocumentError) -> Self {
        self.failures.insert(url.to_string(), error);
        self
    }

    pub fn clicks_on(&self, locator: &Locator) -> usize {
        self.clicks.get(locator).copied().unwrap_or(0)
    }

    fn load(&mut self, url: &str) -> DocumentResult<()> {
        if let Some(err) = self.failures.get(url) {
            return Err(err.clone());
        }
        let page = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| DocumentError::Navigation(format!("404 {url}")))?;
        self.current_url = Some(url.to_string());
        self.current = page;
        Ok(())
    }

    fn element(&self, locator: &Locator, index: usize) -> DocumentResult<&MockElement> {
        self.current
            .get(locator, index)
            .ok_or_else(|| DocumentError::ElementNotFound {
                locator: locator.to_string(),
                index,
            })
    }

    fn holds(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::UrlOrAttributeChanged {
                url,
                locator,
                attribute,
                value,
            } => {
                let now = self
                    .current
                    .get(locator, 0)
                    .and_then(|e| e.attrs.get(attribute).cloned());
                self.current_url.as_deref() != Some(url.as_str()) || now != *value
            }
            Predicate::CountAbove { locator, count } => self.current.count(locator) > *count,
        }
    }
}

#[async_trait]
impl RemoteDocument for MockDocument {
    async fn goto(
        &mut self,
        url: &str,
        _policy: WaitPolicy,
        _timeout: Duration,
    ) -> DocumentResult<()> {
        self.visits.push(url.to_string());
        self.load(url)
    }

    async fn current_url(&self) -> DocumentResult<String> {
        Ok(self
            .current_url
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn wait_for_selector(
        &mut self,
        locator: &Locator,
        visible: bool,
        timeout: Duration,
    ) -> DocumentResult<()> {
        let found = self
            .current
            .elements
            .get(locator)
            .is_some_and(|els| els.iter().any(|e| !visible || e.visible));
        if found {
            Ok(())
        } else {
            Err(DocumentError::timeout(timeout))
        }
    }

    async fn wait_for_idle(&mut self, _timeout: Duration) -> DocumentResult<()> {
        self.idle_waits += 1;
        for (locator, element) in std::mem::take(&mut self.current.after_idle) {
            self.current.elements.entry(locator).or_default().push(element);
        }
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> DocumentResult<usize> {
        Ok(self.current.count(locator))
    }

    async fn text(&self, locator: &Locator, index: usize) -> DocumentResult<Option<String>> {
        Ok(self
            .current
            .get(locator, index)
            .and_then(|e| e.text.clone()))
    }

    async fn attribute(
        &self,
        locator: &Locator,
        index: usize,
        name: &str,
    ) -> DocumentResult<Option<String>> {
        Ok(self
            .current
            .get(locator, index)
            .and_then(|e| e.attrs.get(name).cloned()))
    }

    async fn click(&mut self, locator: &Locator, index: usize) -> DocumentResult<()> {
        self.element(locator, index)?;
        *self.clicks.entry(locator.clone()).or_default() += 1;

        let action = match self.current.on_click.get_mut(locator) {
            Some(queue) if !queue.is_empty() => queue.remove(0),
            _ => ClickAction::Nothing,
        };
        match action {
            ClickAction::Navigate(url) => self.load(&url),
            ClickAction::Append(elements) => {
                for (loc, el) in elements {
                    self.current.elements.entry(loc).or_default().push(el);
                }
                Ok(())
            }
            ClickAction::Nothing => Ok(()),
        }
    }

    async fn is_visible(&self, locator: &Locator, index: usize) -> DocumentResult<bool> {
        Ok(self.element(locator, index)?.visible)
    }

    async fn is_enabled(&self, locator: &Locator, index: usize) -> DocumentResult<bool> {
        Ok(self.element(locator, index)?.enabled)
    }

    async fn has_ancestor_class(
        &self,
        locator: &Locator,
        index: usize,
        class: &str,
    ) -> DocumentResult<bool> {
        Ok(self
            .element(locator, index)?
            .classes
            .iter()
            .any(|c| c == class))
    }

    async fn wait_for(&mut self, predicate: &Predicate, timeout: Duration) -> DocumentResult<()> {
        if self.holds(predicate) {
            Ok(())
        } else {
            Err(DocumentError::timeout(timeout))
        }
    }

    async fn scroll_to_bottom(&mut self) -> DocumentResult<()> {
        self.scrolls += 1;
        Ok(())
    }
}

// ── Page builders ──

/// Short timeouts so a failing test does not hang on a real implementation.
pub fn test_config() -> ScoutConfig {
    ScoutConfig {
        base_url: "https://maps.test".to_string(),
        dom_timeout_ms: 50,
        nav_timeout_ms: 100,
        ..ScoutConfig::default()
    }
}

pub fn map_link(i: usize) -> String {
    format!("https://maps.test/mapshow/{i}")
}

pub fn leaderboard_link(i: usize) -> String {
    format!("https://trackmania.io/#/leaderboard/{i}")
}

/// Listing rows `Map {i}` linking to `/mapshow/{i}` for each `i` in `ids`.
pub fn listing_rows(config: &ScoutConfig, ids: impl IntoIterator<Item = usize>) -> MockPage {
    let rows = ids
        .into_iter()
        .map(|i| MockElement::link(&format!("Map {i}"), &format!("/mapshow/{i}")))
        .collect();
    MockPage::new().with_all(&config.listing.item, rows)
}

/// An enabled next control that loads `target`.
pub fn with_next(page: MockPage, config: &ScoutConfig, target: &str) -> MockPage {
    page.with(&config.listing.next, MockElement::text("Next"))
        .on_click(&config.listing.next, ClickAction::Navigate(target.to_string()))
}

/// A detail page whose short counter label reads `count`, with a leaderboard link.
pub fn detail_page(config: &ScoutConfig, count: &str, leaderboard: Option<&str>) -> MockPage {
    let detail = &config.detail;
    let short = detail.counter.descendant(&detail.counter_short_label);
    let mut page = MockPage::new()
        .with(&detail.counter, MockElement::text(&format!("Records {count}")))
        .with(&short, MockElement::text(count));
    if let Some(href) = leaderboard {
        page = page.with(
            &detail.secondary_links[0],
            MockElement::link("Leaderboard", href),
        );
    }
    page
}

/// A leaderboard with one row per player.
pub fn leaderboard_page(config: &ScoutConfig, players: &[&str]) -> MockPage {
    let lb = &config.leaderboard;
    let mut page = MockPage::new();
    for player in players {
        page = page
            .with(&lb.row, MockElement::new())
            .with(&lb.identity_cell, MockElement::text(player));
    }
    page
}

/// One "load more" batch adding rows for `players`.
pub fn load_more_batch(config: &ScoutConfig, players: &[&str]) -> ClickAction {
    let lb = &config.leaderboard;
    let mut elements = Vec::new();
    for player in players {
        elements.push((lb.row.clone(), MockElement::new()));
        elements.push((lb.identity_cell.clone(), MockElement::text(player)));
    }
    ClickAction::Append(elements)
}
