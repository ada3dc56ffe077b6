// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-backed documents.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). A context is a
//! single tab and implements the core `RemoteDocument` contract.

pub mod chromium;
pub mod script;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use record_scout::document::RemoteDocument;

/// Environment variable pointing at a Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "RECORD_SCOUT_CHROMIUM_PATH";

/// A running browser.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a fresh tab.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Close the browser process.
    async fn shutdown(&mut self) -> Result<()>;
    /// Number of currently open contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser tab.
#[async_trait]
pub trait RenderContext: RemoteDocument {
    /// This context as the document the pipeline drives.
    fn document(&mut self) -> &mut dyn RemoteDocument;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Locate a Chromium or Chrome binary, or `None` if nothing usable is installed.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. explicit override
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.record-scout/chromium/
    if let Some(home) = dirs::home_dir() {
        let root = home.join(".record-scout/chromium");
        let candidates = if cfg!(target_os = "macos") {
            vec![
                root.join("chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                root.join("chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                root.join("chrome"),
            ]
        } else {
            vec![root.join("chrome-linux64/chrome"), root.join("chrome")]
        };
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    // 3. PATH lookup
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. macOS application bundle
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}
