//! Selector tables for the host feed's markup.
//!
//! These strings are an external contract with the host page and break when
//! its markup changes. Revalidate them against a live feed whenever extraction
//! starts coming back empty.

use crate::error::{BrowserError, Result};
use scraper::Selector;

/// Editable comment composers
pub const COMMENT_INPUT_SELECTORS: &[&str] = &[
    r#"div[contenteditable="true"][data-placeholder*="comment"]"#,
    r#"div[contenteditable="true"][data-placeholder*="Comment"]"#,
    r#"div[contenteditable="true"][aria-label*="comment"]"#,
    r#"div[contenteditable="true"][aria-label*="Comment"]"#,
];

/// Markers identifying an ancestor as (or holding) a post
pub const POST_CONTAINER_SELECTORS: &[&str] = &[
    r#"[data-test-id="post-text"]"#,
    ".feed-shared-update-v2__description",
    ".feed-shared-text",
    ".feed-shared-update-v2__content",
    ".artdeco-card",
    r#"[data-test-id="post-content"]"#,
];

/// Classes of the looser container classifier
pub const LOOSE_CONTAINER_CLASSES: &[&str] = &["feed-shared-update-v2", "artdeco-card"];

/// Elements holding the post body, most specific first
pub const POST_TEXT_SELECTORS: &[&str] = &[
    r#"[data-test-id="post-text"]"#,
    ".feed-shared-text__text",
    ".feed-shared-inline-show-more-text",
    ".break-words",
    ".feed-shared-text__text--rich",
    ".feed-shared-text__text--rich-text",
    ".feed-shared-text__text--rich-text-wrapper",
];

/// Top-level feed items scanned as a last resort
pub const FEED_ITEM_SELECTOR: &str = ".feed-shared-update-v2, .artdeco-card";

/// Controls that reveal truncated post text
pub const SEE_MORE_SELECTORS: &[&str] = &[
    ".feed-shared-inline-show-more-text__see-more-less-toggle",
    ".see-more",
    r#"[aria-label*="see more"]"#,
    ".feed-shared-inline-show-more-text__dynamic-more-text",
    ".feed-shared-inline-show-more-text button",
    r#"button[role="button"]"#,
];

/// Parsed selector tables shared by the feed heuristics
#[derive(Debug, Clone)]
pub struct FeedSelectors {
    pub comment_input: Selector,
    pub post_containers: Vec<Selector>,
    pub loose_container_classes: Vec<String>,
    pub post_text: Vec<Selector>,
    pub feed_items: Selector,
    pub see_more: Vec<Selector>,
}

impl FeedSelectors {
    /// Parse the built-in tables
    pub fn linkedin() -> Result<Self> {
        Ok(Self {
            comment_input: parse_selector(&COMMENT_INPUT_SELECTORS.join(", "))?,
            post_containers: parse_all(POST_CONTAINER_SELECTORS)?,
            loose_container_classes: LOOSE_CONTAINER_CLASSES.iter().map(|c| c.to_string()).collect(),
            post_text: parse_all(POST_TEXT_SELECTORS)?,
            feed_items: parse_selector(FEED_ITEM_SELECTOR)?,
            see_more: parse_all(SEE_MORE_SELECTORS)?,
        })
    }
}

fn parse_all(sources: &[&str]) -> Result<Vec<Selector>> {
    sources.iter().map(|s| parse_selector(s)).collect()
}

pub(crate) fn parse_selector(source: &str) -> Result<Selector> {
    Selector::parse(source).map_err(|e| BrowserError::InvalidSelector {
        selector: source.to_string(),
        reason: format!("{:?}", e),
    })
}
