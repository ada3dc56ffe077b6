// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote document abstraction.
//!
//! Defines the `RemoteDocument` trait the pipeline drives: navigation,
//! bounded waits, element queries, and clicks on a single live page. The core
//! crate never talks to a browser directly; the runtime supplies a Chromium
//! implementation and tests supply a scripted in-memory one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long `goto` waits before considering a navigation complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    /// The `load` event fired.
    Load,
    /// The DOM was parsed.
    #[default]
    DomContentLoaded,
    /// No network activity for a short quiet period.
    NetworkIdle,
}

/// Identifies a set of elements on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// A CSS selector.
    Css { selector: String },
    /// Elements exposing `role` whose accessible name contains `name`
    /// (case-insensitive).
    Role { role: String, name: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Narrow a CSS locator to descendants matching `selector`.
    ///
    /// Role locators cannot be nested with CSS and are returned unchanged.
    pub fn descendant(&self, selector: &str) -> Self {
        match self {
            Self::Css { selector: parent } => Self::css(format!("{parent} {selector}")),
            Self::Role { .. } => self.clone(),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css { selector } => write!(f, "{selector}"),
            Self::Role { role, name } => write!(f, "role={role}[name~={name:?}]"),
        }
    }
}

/// A condition on page state that a document can wait for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Either the page URL differs from `url`, or attribute `attribute` of the
    /// first element matched by `locator` differs from `value`.
    UrlOrAttributeChanged {
        url: String,
        locator: Locator,
        attribute: String,
        value: Option<String>,
    },
    /// More than `count` elements match `locator`.
    CountAbove { locator: Locator, count: usize },
}

/// Errors returned by a remote document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script failed: {0}")]
    Script(String),

    #[error("element {locator} #{index} not found")]
    ElementNotFound { locator: String, index: usize },

    #[error("document closed")]
    Closed,
}

impl DocumentError {
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout(after.as_millis() as u64)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Convenience result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// A single live page the pipeline drives.
///
/// Every waiting call owns its timeout; implementations must return
/// `DocumentError::Timeout` when it elapses and must not retry.
#[async_trait]
pub trait RemoteDocument: Send + Sync {
    /// Navigate to `url`.
    async fn goto(&mut self, url: &str, policy: WaitPolicy, timeout: Duration)
        -> DocumentResult<()>;

    /// The URL currently displayed.
    async fn current_url(&self) -> DocumentResult<String>;

    /// Wait until at least one element matches `locator` (and is visible if
    /// `visible` is set).
    async fn wait_for_selector(
        &mut self,
        locator: &Locator,
        visible: bool,
        timeout: Duration,
    ) -> DocumentResult<()>;

    /// Wait until the page has finished loading and the network is quiet.
    async fn wait_for_idle(&mut self, timeout: Duration) -> DocumentResult<()>;

    /// Number of elements currently matching `locator`.
    async fn count(&self, locator: &Locator) -> DocumentResult<usize>;

    /// Rendered text of the `index`-th match, `None` if there is no such element.
    async fn text(&self, locator: &Locator, index: usize) -> DocumentResult<Option<String>>;

    /// Attribute `name` of the `index`-th match, `None` if the element or the
    /// attribute is missing.
    async fn attribute(
        &self,
        locator: &Locator,
        index: usize,
        name: &str,
    ) -> DocumentResult<Option<String>>;

    /// Click the `index`-th match once.
    async fn click(&mut self, locator: &Locator, index: usize) -> DocumentResult<()>;

    async fn is_visible(&self, locator: &Locator, index: usize) -> DocumentResult<bool>;

    /// False when the element carries a `disabled` attribute or state.
    async fn is_enabled(&self, locator: &Locator, index: usize) -> DocumentResult<bool>;

    /// True when the element or one of its ancestors has CSS class `class`.
    async fn has_ancestor_class(
        &self,
        locator: &Locator,
        index: usize,
        class: &str,
    ) -> DocumentResult<bool>;

    /// Wait until `predicate` holds.
    async fn wait_for(&mut self, predicate: &Predicate, timeout: Duration) -> DocumentResult<()>;

    async fn scroll_to_bottom(&mut self) -> DocumentResult<()>;
}
