// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Browser session for one run.
//!
//! A session owns the renderer and the single tab the whole pipeline drives.
//! It is opened once before the crawl and closed once at the end of the run,
//! whether the pipeline succeeded or not.

use crate::renderer::{RenderContext, Renderer};
use anyhow::{Context, Result};
use record_scout::document::RemoteDocument;
use std::time::Instant;
use tracing::{debug, warn};

/// One browser plus one tab.
pub struct BrowserSession {
    renderer: Box<dyn Renderer>,
    context: Box<dyn RenderContext>,
    created_at: Instant,
}

impl BrowserSession {
    /// Open a tab on `renderer`. The renderer is shut down if that fails.
    pub async fn open(mut renderer: Box<dyn Renderer>) -> Result<Self> {
        let context = match renderer.new_context().await {
            Ok(context) => context,
            Err(e) => {
                if let Err(shutdown) = renderer.shutdown().await {
                    warn!("browser shutdown after failed open: {shutdown:#}");
                }
                return Err(e).context("failed to open browser tab");
            }
        };
        debug!("browser session opened");
        Ok(Self {
            renderer,
            context,
            created_at: Instant::now(),
        })
    }

    /// The document the pipeline drives.
    pub fn document(&mut self) -> &mut dyn RemoteDocument {
        self.context.document()
    }

    /// Close the tab, then the browser. Both are attempted even if the first fails.
    pub async fn close(self) -> Result<()> {
        let Self {
            mut renderer,
            context,
            created_at,
        } = self;
        let tab = context.close().await;
        let browser = renderer.shutdown().await;
        debug!(
            "browser session closed after {:.1}s",
            created_at.elapsed().as_secs_f64()
        );
        tab.context("failed to close browser tab")?;
        browser.context("failed to shut down browser")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use record_scout::document::{DocumentResult, Locator, Predicate, WaitPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        open: AtomicUsize,
        closed: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    struct FakeRenderer {
        counters: Arc<Counters>,
        fail_open: bool,
    }

    struct FakeContext {
        counters: Arc<Counters>,
        url: String,
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
            if self.fail_open {
                anyhow::bail!("no tab");
            }
            self.counters.open.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeContext {
                counters: Arc::clone(&self.counters),
                url: "about:blank".to_string(),
            }))
        }

        async fn shutdown(&mut self) -> Result<()> {
            self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn active_contexts(&self) -> usize {
            self.counters.open.load(Ordering::SeqCst) - self.counters.closed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteDocument for FakeContext {
        async fn goto(&mut self, url: &str, _: WaitPolicy, _: Duration) -> DocumentResult<()> {
            self.url = url.to_string();
            Ok(())
        }
        async fn current_url(&self) -> DocumentResult<String> {
            Ok(self.url.clone())
        }
        async fn wait_for_selector(&mut self, _: &Locator, _: bool, _: Duration) -> DocumentResult<()> {
            Ok(())
        }
        async fn wait_for_idle(&mut self, _: Duration) -> DocumentResult<()> {
            Ok(())
        }
        async fn count(&self, _: &Locator) -> DocumentResult<usize> {
            Ok(0)
        }
        async fn text(&self, _: &Locator, _: usize) -> DocumentResult<Option<String>> {
            Ok(None)
        }
        async fn attribute(&self, _: &Locator, _: usize, _: &str) -> DocumentResult<Option<String>> {
            Ok(None)
        }
        async fn click(&mut self, _: &Locator, _: usize) -> DocumentResult<()> {
            Ok(())
        }
        async fn is_visible(&self, _: &Locator, _: usize) -> DocumentResult<bool> {
            Ok(false)
        }
        async fn is_enabled(&self, _: &Locator, _: usize) -> DocumentResult<bool> {
            Ok(false)
        }
        async fn has_ancestor_class(&self, _: &Locator, _: usize, _: &str) -> DocumentResult<bool> {
            Ok(false)
        }
        async fn wait_for(&mut self, _: &Predicate, _: Duration) -> DocumentResult<()> {
            Ok(())
        }
        async fn scroll_to_bottom(&mut self) -> DocumentResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl RenderContext for FakeContext {
        fn document(&mut self) -> &mut dyn RemoteDocument {
            self
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_session_opens_one_tab_and_closes_everything() {
        let counters = Arc::new(Counters::default());
        let renderer = FakeRenderer {
            counters: Arc::clone(&counters),
            fail_open: false,
        };
        let mut session = BrowserSession::open(Box::new(renderer)).await.unwrap();

        let doc = session.document();
        doc.goto("https://maps.test/", WaitPolicy::default(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(doc.current_url().await.unwrap(), "https://maps.test/");

        session.close().await.unwrap();
        assert_eq!(counters.open.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_open_shuts_renderer_down() {
        let counters = Arc::new(Counters::default());
        let renderer = FakeRenderer {
            counters: Arc::clone(&counters),
            fail_open: true,
        };
        let err = BrowserSession::open(Box::new(renderer)).await.err().unwrap();
        assert!(format!("{err:#}").contains("no tab"));
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }
}
