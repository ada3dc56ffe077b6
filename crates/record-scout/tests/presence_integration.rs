// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Leaderboard search against the scripted document.

mod common;

use common::*;
use record_scout::config::ScoutConfig;
use record_scout::document::DocumentError;
use record_scout::presence::{PresenceSearcher, SearchError};
use record_scout::types::TechnicalCode;

fn searcher(config: &ScoutConfig) -> PresenceSearcher<'_> {
    PresenceSearcher::new(&config.leaderboard, config.dom_timeout(), config.nav_timeout())
}

#[tokio::test]
async fn test_case_insensitive_substring_hit() {
    let config = test_config();
    let lb = leaderboard_link(1);
    let page = leaderboard_page(&config, &["Someone", "  misspleaSE  ", "Other"]);
    let mut doc = MockDocument::new().page(&lb, page);

    let found = searcher(&config)
        .search(&mut doc, &lb, "MissPlease", 10)
        .await
        .unwrap();
    assert!(found);
}

#[tokio::test]
async fn test_miss() {
    let config = test_config();
    let lb = leaderboard_link(1);
    let mut doc = MockDocument::new().page(&lb, leaderboard_page(&config, &["A", "B"]));

    let found = searcher(&config)
        .search(&mut doc, &lb, "MissPlease", 10)
        .await
        .unwrap();
    assert!(!found);
}

#[tokio::test]
async fn test_load_more_reveals_player() {
    let config = test_config();
    let more = &config.leaderboard.load_more;
    let lb = leaderboard_link(1);
    let page = leaderboard_page(&config, &["A"])
        .with(more, MockElement::text("Load more"))
        .on_click(more, load_more_batch(&config, &["B"]))
        .on_click(more, load_more_batch(&config, &["[TM] MissPlease"]));
    let mut doc = MockDocument::new().page(&lb, page);

    let found = searcher(&config)
        .search(&mut doc, &lb, "missplease", 10)
        .await
        .unwrap();
    assert!(found);
    // Third click adds nothing and ends expansion.
    assert_eq!(doc.clicks_on(more), 3);
    assert_eq!(doc.scrolls, 3);
}

#[tokio::test]
async fn test_expansion_is_bounded() {
    let config = test_config();
    let more = &config.leaderboard.load_more;
    let lb = leaderboard_link(1);
    let mut page = leaderboard_page(&config, &["A"]).with(more, MockElement::text("Load more"));
    for i in 0..10 {
        page = page.on_click(more, load_more_batch(&config, &[&format!("P{i}")]));
    }
    page = page.on_click(more, load_more_batch(&config, &["MissPlease"]));
    let mut doc = MockDocument::new().page(&lb, page);

    let found = searcher(&config)
        .search(&mut doc, &lb, "MissPlease", 2)
        .await
        .unwrap();
    assert!(!found);
    assert_eq!(doc.clicks_on(more), 2);
}

#[tokio::test]
async fn test_disabled_or_hidden_load_more_not_clicked() {
    let config = test_config();
    let more = &config.leaderboard.load_more;
    let lb = leaderboard_link(1);

    for control in [
        MockElement::text("Load more").disabled(),
        MockElement::text("Load more").hidden(),
    ] {
        let page = leaderboard_page(&config, &["A"])
            .with(more, control)
            .on_click(more, load_more_batch(&config, &["MissPlease"]));
        let mut doc = MockDocument::new().page(&lb, page);
        let found = searcher(&config)
            .search(&mut doc, &lb, "MissPlease", 10)
            .await
            .unwrap();
        assert!(!found);
        assert_eq!(doc.clicks_on(more), 0);
    }
}

#[tokio::test]
async fn test_no_rows_is_search_timeout() {
    let config = test_config();
    let lb = leaderboard_link(1);
    let mut doc = MockDocument::new().page(&lb, MockPage::new());

    let err = searcher(&config)
        .search(&mut doc, &lb, "MissPlease", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Timeout(_)));
    assert_eq!(err.code(), TechnicalCode::SearchTimeout);
}

#[tokio::test]
async fn test_navigation_failure_is_search_error() {
    let config = test_config();
    let lb = leaderboard_link(1);
    let mut doc = MockDocument::new().fail(&lb, DocumentError::Navigation("blocked".into()));

    let err = searcher(&config)
        .search(&mut doc, &lb, "MissPlease", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Navigation(_)));
    assert_eq!(err.code(), TechnicalCode::SearchError);
}
