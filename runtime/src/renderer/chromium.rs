// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-backed document using chromiumoxide.

use super::{find_chromium, script, RenderContext, Renderer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use record_scout::document::{
    DocumentError, DocumentResult, Locator, Predicate, RemoteDocument, WaitPolicy,
};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Upper bound for a single script evaluation.
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between predicate checks while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How the browser is started.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Show the browser window.
    pub headful: bool,
    /// Binary to launch; discovered with `find_chromium` when unset.
    pub executable: Option<PathBuf>,
    /// CDP request timeout, normally the navigation timeout. Never shorter
    /// than the script timeout.
    pub request_timeout: Option<Duration>,
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance.
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        let chrome_path = match options.executable {
            Some(path) => path,
            None => find_chromium().context(
                "Chromium not found. Install Chrome or set RECORD_SCOUT_CHROMIUM_PATH.",
            )?,
        };
        debug!("launching {}", chrome_path.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(timeout) = options.request_timeout {
            builder = builder.request_timeout(timeout.max(SCRIPT_TIMEOUT));
        }
        builder = if options.headful {
            builder.with_head()
        } else {
            builder.arg("--headless=new")
        };
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            handler,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed.context("failed to close Chromium")?;
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium tab.
pub struct ChromiumContext {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumContext {
    /// Evaluate `js` and deserialize its JSON result.
    ///
    /// The value is serialized in the page so `null` survives the protocol
    /// round trip.
    async fn eval<T: DeserializeOwned>(&self, js: &str) -> DocumentResult<T> {
        let params = EvaluateParams::builder()
            .expression(format!("JSON.stringify(({js}) ?? null)"))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(DocumentError::Script)?;

        let result = tokio::time::timeout(SCRIPT_TIMEOUT, self.page.evaluate_expression(params))
            .await
            .map_err(|_| DocumentError::timeout(SCRIPT_TIMEOUT))?
            .map_err(|e| DocumentError::Script(e.to_string()))?;

        let raw: String = result
            .into_value()
            .map_err(|e| DocumentError::Script(format!("unexpected script result: {e}")))?;
        serde_json::from_str(&raw)
            .map_err(|e| DocumentError::Script(format!("unexpected script result {raw:?}: {e}")))
    }

    /// Like `eval`, but a `null` result means the element is missing.
    async fn eval_element<T: DeserializeOwned>(
        &self,
        js: &str,
        locator: &Locator,
        index: usize,
    ) -> DocumentResult<T> {
        self.eval::<Option<T>>(js)
            .await?
            .ok_or_else(|| DocumentError::ElementNotFound {
                locator: locator.to_string(),
                index,
            })
    }

    /// Poll `js` until it evaluates to `true` or `timeout` elapses.
    async fn poll(&self, js: &str, timeout: Duration) -> DocumentResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.eval::<bool>(js).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                // Evaluation fails transiently while a navigation swaps the page.
                Err(DocumentError::Script(e)) => debug!("poll: {e}"),
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(DocumentError::timeout(timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// A CDP request timeout is a navigation timeout, not a navigation failure.
fn navigation_error(e: CdpError, timeout: Duration) -> DocumentError {
    match e {
        CdpError::Timeout => DocumentError::timeout(timeout),
        other => DocumentError::Navigation(other.to_string()),
    }
}

#[async_trait]
impl RemoteDocument for ChromiumContext {
    async fn goto(
        &mut self,
        url: &str,
        policy: WaitPolicy,
        timeout: Duration,
    ) -> DocumentResult<()> {
        let start = Instant::now();
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(navigation_error(e, timeout)),
            Err(_) => return Err(DocumentError::timeout(timeout)),
        }
        debug!("loaded {url} in {}ms", start.elapsed().as_millis());

        let remaining = timeout.saturating_sub(start.elapsed());
        match policy {
            WaitPolicy::DomContentLoaded => Ok(()),
            WaitPolicy::Load => self.poll(script::READY_STATE_COMPLETE, remaining).await,
            WaitPolicy::NetworkIdle => self.wait_for_idle(remaining).await,
        }
    }

    async fn current_url(&self) -> DocumentResult<String> {
        self.eval(script::CURRENT_URL).await
    }

    async fn wait_for_selector(
        &mut self,
        locator: &Locator,
        visible: bool,
        timeout: Duration,
    ) -> DocumentResult<()> {
        self.poll(&script::any_present(locator, visible), timeout).await
    }

    async fn wait_for_idle(&mut self, timeout: Duration) -> DocumentResult<()> {
        self.poll(script::READY_STATE_COMPLETE, timeout).await?;
        let quiet = tokio::time::timeout(timeout, self.page.wait_for_navigation()).await;
        match quiet {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(navigation_error(e, timeout)),
            Err(_) => Err(DocumentError::timeout(timeout)),
        }
    }

    async fn count(&self, locator: &Locator) -> DocumentResult<usize> {
        self.eval(&script::count(locator)).await
    }

    async fn text(&self, locator: &Locator, index: usize) -> DocumentResult<Option<String>> {
        self.eval(&script::text(locator, index)).await
    }

    async fn attribute(
        &self,
        locator: &Locator,
        index: usize,
        name: &str,
    ) -> DocumentResult<Option<String>> {
        self.eval(&script::attribute(locator, index, name)).await
    }

    async fn click(&mut self, locator: &Locator, index: usize) -> DocumentResult<()> {
        let clicked: bool = self.eval(&script::click(locator, index)).await?;
        if clicked {
            Ok(())
        } else {
            Err(DocumentError::ElementNotFound {
                locator: locator.to_string(),
                index,
            })
        }
    }

    async fn is_visible(&self, locator: &Locator, index: usize) -> DocumentResult<bool> {
        self.eval_element(&script::is_visible(locator, index), locator, index)
            .await
    }

    async fn is_enabled(&self, locator: &Locator, index: usize) -> DocumentResult<bool> {
        self.eval_element(&script::is_enabled(locator, index), locator, index)
            .await
    }

    async fn has_ancestor_class(
        &self,
        locator: &Locator,
        index: usize,
        class: &str,
    ) -> DocumentResult<bool> {
        self.eval_element(
            &script::has_ancestor_class(locator, index, class),
            locator,
            index,
        )
        .await
    }

    async fn wait_for(&mut self, predicate: &Predicate, timeout: Duration) -> DocumentResult<()> {
        self.poll(&script::predicate(predicate), timeout).await
    }

    async fn scroll_to_bottom(&mut self) -> DocumentResult<()> {
        let _: bool = self.eval(script::SCROLL_TO_BOTTOM).await?;
        Ok(())
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    fn document(&mut self) -> &mut dyn RemoteDocument {
        self
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        self.page.close().await.context("failed to close tab")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdp_timeout_is_navigation_timeout() {
        let timeout = Duration::from_secs(45);
        let err = navigation_error(CdpError::Timeout, timeout);
        assert!(err.is_timeout());
        assert_eq!(err, DocumentError::timeout(timeout));

        let err = navigation_error(CdpError::NoResponse, timeout);
        assert!(matches!(err, DocumentError::Navigation(_)));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_document_queries() {
        let mut renderer = ChromiumRenderer::launch(LaunchOptions::default())
            .await
            .expect("failed to launch");
        let mut ctx = renderer.new_context().await.expect("failed to open tab");
        let timeout = Duration::from_secs(10);

        let html = "data:text/html,<div class='list disabled'><a class='map-name' href='/m/1'> Map 1 </a>\
                    <button id='next' disabled>Next</button></div>";
        let doc = ctx.document();
        doc.goto(html, WaitPolicy::Load, timeout)
            .await
            .expect("navigation failed");

        let item = Locator::css("a.map-name");
        let next = Locator::css("#next");
        doc.wait_for_selector(&item, true, timeout).await.unwrap();
        assert_eq!(doc.count(&item).await.unwrap(), 1);
        assert_eq!(
            doc.text(&item, 0).await.unwrap().map(|t| t.trim().to_string()),
            Some("Map 1".to_string())
        );
        assert_eq!(
            doc.attribute(&item, 0, "href").await.unwrap(),
            Some("/m/1".to_string())
        );
        assert!(!doc.is_enabled(&next, 0).await.unwrap());
        assert!(doc.has_ancestor_class(&next, 0, "disabled").await.unwrap());
        assert_eq!(doc.text(&item, 5).await.unwrap(), None);

        let err = doc
            .wait_for(
                &Predicate::CountAbove {
                    locator: item.clone(),
                    count: 1,
                },
                Duration::from_millis(300),
            )
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        ctx.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
        renderer.shutdown().await.expect("shutdown failed");
    }
}
