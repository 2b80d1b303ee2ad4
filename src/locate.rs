//! Finding the post a comment composer belongs to.
//!
//! The feed markup gives no reliable link between a composer and its post, so
//! [`PostLocator`] runs an ordered cascade of heuristics over a [`DomTree`]
//! snapshot and stops at the first one that yields text:
//!
//! 1. [`ContainerStrategy::Marked`]: nearest ancestor that is or holds a known post marker
//! 2. [`ContainerStrategy::Loose`]: nearest ancestor that merely looks like a post
//! 3. [`ExtractStrategy::PostText`]: a known post-body element inside the container
//! 4. [`ExtractStrategy::FilteredContainer`]: the container's text minus comment chrome
//! 5. [`ExtractStrategy::FeedScan`]: the first clean feed item elsewhere on the page
//!
//! An empty result means the caller must not contact the generation service.

use crate::dom::{DomTree, ElementRef, FeedSelectors, ancestors, contains, handle, has_class, text_content};
use crate::text::{normalize, truncate_chars};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Ancestor levels searched for a marked post container
pub const MARKED_CONTAINER_DEPTH: usize = 15;
/// Ancestor levels searched by the loose container classifier
pub const LOOSE_CONTAINER_DEPTH: usize = 10;
/// A post-body candidate must be longer than this many characters
pub const MIN_POST_TEXT_CHARS: usize = 10;
/// Container and feed-item text must be longer than this many characters
pub const MIN_CONTAINER_TEXT_CHARS: usize = 20;
/// Filtered container text is cut to this many characters
pub const MAX_CONTAINER_TEXT_CHARS: usize = 1000;
/// Feed items at or above this many characters are ignored
pub const MAX_FEED_ITEM_CHARS: usize = 2000;

/// Comment-UI phrases dropping a container line, matched case-insensitively as substrings
pub const NOISE_PHRASES: &[&str] = &["add a comment", "comment", "like", "reply", "share"];

/// Phrases disqualifying a whole feed item in the last-resort scan
pub const FEED_SCAN_NOISE: &[&str] = &["add a comment", "comment", "like", "reply"];

static RELATIVE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[a-z]*$").expect("relative time pattern is valid"));

/// Whether `text` contains any of `phrases`, ignoring case
pub fn contains_noise(text: &str, phrases: &[&str]) -> bool {
    let lower = text.to_lowercase();
    phrases.iter().any(|phrase| lower.contains(phrase))
}

/// Whether a line is chrome: an action label or a relative timestamp like `2w`
pub fn is_noise_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || contains_noise(trimmed, NOISE_PHRASES) || RELATIVE_TIME.is_match(trimmed)
}

/// Ways of picking the post container from the composer's ancestors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStrategy {
    /// Ancestor matching, or holding a descendant matching, a post marker
    Marked,
    /// Ancestor with a feed-card class or a post-ish `data-test-id`
    Loose,
}

impl ContainerStrategy {
    pub fn find<'a>(self, input: ElementRef<'a>, selectors: &FeedSelectors) -> Option<ElementRef<'a>> {
        match self {
            Self::Marked => ancestors(input).take(MARKED_CONTAINER_DEPTH).find(|ancestor| {
                selectors
                    .post_containers
                    .iter()
                    .any(|marker| marker.matches(ancestor) || ancestor.select(marker).next().is_some())
            }),
            Self::Loose => ancestors(input).take(LOOSE_CONTAINER_DEPTH).find(|&ancestor| {
                selectors
                    .loose_container_classes
                    .iter()
                    .any(|class| has_class(ancestor, class))
                    || ancestor
                        .value()
                        .attr("data-test-id")
                        .is_some_and(|id| id.contains("post"))
            }),
        }
    }
}

/// Ways of turning a container (or the whole feed) into post text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    /// First known post-body element with enough text
    PostText,
    /// The container's own text with comment-UI lines dropped
    FilteredContainer,
    /// Any other feed item that reads like a post
    FeedScan,
}

impl ExtractStrategy {
    pub fn extract(
        self,
        tree: &DomTree,
        input: ElementRef<'_>,
        container: Option<ElementRef<'_>>,
        selectors: &FeedSelectors,
    ) -> Option<String> {
        match self {
            Self::PostText => {
                let container = container?;
                selectors.post_text.iter().find_map(|selector| {
                    let element = container.select(selector).next()?;
                    let text = flatten(&normalize(&text_content(element)));
                    (text.chars().count() > MIN_POST_TEXT_CHARS).then_some(text)
                })
            }
            Self::FilteredContainer => {
                let container = container?;
                let text = normalize(&text_content(container));
                if text.chars().count() <= MIN_CONTAINER_TEXT_CHARS {
                    return None;
                }
                let kept: Vec<&str> = text.lines().filter(|line| !is_noise_line(line)).collect();
                if kept.is_empty() {
                    return None;
                }
                let joined = kept.join(" ");
                Some(truncate_chars(&joined, MAX_CONTAINER_TEXT_CHARS).to_string())
            }
            Self::FeedScan => tree
                .root()
                .select(&selectors.feed_items)
                .filter(|&item| !contains(item, input))
                .find_map(|item| {
                    let text = flatten(&normalize(&text_content(item)));
                    let len = text.chars().count();
                    (len > MIN_CONTAINER_TEXT_CHARS
                        && len < MAX_FEED_ITEM_CHARS
                        && !contains_noise(&text, FEED_SCAN_NOISE))
                    .then_some(text)
                }),
        }
    }
}

/// Join normalized lines into one paragraph
fn flatten(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}

/// Outcome of a locate run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<'a> {
    pub text: String,
    pub container: Option<ElementRef<'a>>,
    pub strategy: Option<ExtractStrategy>,
}

impl Located<'_> {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The ordered extraction cascade
#[derive(Debug, Clone)]
pub struct PostLocator {
    selectors: FeedSelectors,
    containers: Vec<ContainerStrategy>,
    extractors: Vec<ExtractStrategy>,
}

impl PostLocator {
    pub fn new(selectors: FeedSelectors) -> Self {
        Self {
            selectors,
            containers: vec![ContainerStrategy::Marked, ContainerStrategy::Loose],
            extractors: vec![
                ExtractStrategy::PostText,
                ExtractStrategy::FilteredContainer,
                ExtractStrategy::FeedScan,
            ],
        }
    }

    pub fn selectors(&self) -> &FeedSelectors {
        &self.selectors
    }

    /// Find the container, then run the extractors in order
    pub fn locate<'a>(&self, tree: &DomTree, input: ElementRef<'a>) -> Located<'a> {
        let container = self
            .containers
            .iter()
            .find_map(|strategy| strategy.find(input, &self.selectors));
        debug!(
            "post container for composer {:?}: {:?}",
            handle(input),
            container.map(|c| (c.value().name().to_string(), handle(c)))
        );

        for &strategy in &self.extractors {
            if let Some(text) = strategy.extract(tree, input, container, &self.selectors) {
                if !text.is_empty() {
                    debug!("post text found via {:?} ({} chars)", strategy, text.chars().count());
                    return Located {
                        text,
                        container,
                        strategy: Some(strategy),
                    };
                }
            }
        }

        debug!("no post text found for composer {:?}", handle(input));
        Located {
            text: String::new(),
            container,
            strategy: None,
        }
    }

    /// Post text for a composer, empty when nothing plausible was found
    pub fn extract_post_content(&self, tree: &DomTree, input: ElementRef<'_>) -> String {
        self.locate(tree, input).text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;

    fn locator() -> PostLocator {
        PostLocator::new(FeedSelectors::linkedin().unwrap())
    }

    fn composer() -> ElementNode {
        ElementNode::new("div")
            .with_attribute("id", "composer")
            .with_attribute("contenteditable", "true")
            .with_attribute("data-placeholder", "Add a comment…")
    }

    fn comments_box() -> ElementNode {
        ElementNode::new("div")
            .with_class("comments-comment-box")
            .with_child(ElementNode::new("form").with_child(composer()))
    }

    fn input_of(tree: &DomTree) -> ElementRef<'_> {
        tree.get_element_by_id("composer").unwrap()
    }

    #[test]
    fn test_noise_lines() {
        assert!(is_noise_line("Like"));
        assert!(is_noise_line("  Reply "));
        assert!(is_noise_line("2w"));
        assert!(is_noise_line("14"));
        assert!(is_noise_line("Add a comment…"));
        assert!(is_noise_line("Share this"));
        assert!(is_noise_line(""));
        assert!(!is_noise_line("We shipped v2 today"));
        assert!(!is_noise_line("v2"));
    }

    #[test]
    fn test_marked_container_via_descendant_marker() {
        let root = ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_attribute("id", "post")
                .with_child(
                    ElementNode::new("div")
                        .with_class("feed-shared-text")
                        .with_text("Hiring two backend engineers in Berlin"),
                )
                .with_child(comments_box()),
        );
        let tree = DomTree::new(root);
        let selectors = FeedSelectors::linkedin().unwrap();

        let found = ContainerStrategy::Marked.find(input_of(&tree), &selectors);
        assert_eq!(found, tree.get_element_by_id("post"));
    }

    fn nested_in_card(wrappers: usize) -> DomTree {
        let mut inner = composer();
        for _ in 0..wrappers {
            inner = ElementNode::new("div").with_child(inner);
        }
        let card = ElementNode::new("div")
            .with_attribute("id", "card")
            .with_class("artdeco-card")
            .with_child(inner);
        DomTree::new(ElementNode::new("body").with_child(card))
    }

    #[test]
    fn test_marked_container_depth_limit() {
        let selectors = FeedSelectors::linkedin().unwrap();

        let reachable = nested_in_card(MARKED_CONTAINER_DEPTH - 1);
        assert_eq!(
            ContainerStrategy::Marked.find(input_of(&reachable), &selectors),
            reachable.get_element_by_id("card")
        );

        let too_deep = nested_in_card(MARKED_CONTAINER_DEPTH);
        assert_eq!(ContainerStrategy::Marked.find(input_of(&too_deep), &selectors), None);
        assert_eq!(ContainerStrategy::Loose.find(input_of(&too_deep), &selectors), None);
    }

    #[test]
    fn test_loose_container_by_data_test_id() {
        let root = ElementNode::new("body").with_child(
            ElementNode::new("section")
                .with_attribute("id", "wrapper")
                .with_attribute("data-test-id", "main-post-wrapper")
                .with_child(comments_box()),
        );
        let tree = DomTree::new(root);
        let selectors = FeedSelectors::linkedin().unwrap();

        assert_eq!(ContainerStrategy::Marked.find(input_of(&tree), &selectors), None);
        assert_eq!(
            ContainerStrategy::Loose.find(input_of(&tree), &selectors),
            tree.get_element_by_id("wrapper")
        );
    }

    #[test]
    fn test_post_text_skips_short_candidates() {
        let root = ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_class("feed-shared-update-v2 artdeco-card")
                .with_child(ElementNode::new("span").with_class("break-words").with_text("Short"))
                .with_child(
                    ElementNode::new("div")
                        .with_class("feed-shared-text__text--rich")
                        .with_child(ElementNode::new("p").with_text("Our team crossed"))
                        .with_child(ElementNode::new("p").with_text("10k users this week")),
                )
                .with_child(comments_box()),
        );
        let tree = DomTree::new(root);

        let located = locator().locate(&tree, input_of(&tree));
        assert_eq!(located.strategy, Some(ExtractStrategy::PostText));
        assert_eq!(located.text, "Our team crossed 10k users this week");
    }

    #[test]
    fn test_filtered_container_drops_noise_lines() {
        let root = ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_class("artdeco-card")
                .with_child(ElementNode::new("div").with_text("Jane Doe"))
                .with_child(ElementNode::new("div").with_text("Product lead at Example"))
                .with_child(ElementNode::new("div").with_text("3d"))
                .with_child(ElementNode::new("div").with_text("Launch notes are up on the blog"))
                .with_child(ElementNode::new("div").with_text("Like"))
                .with_child(ElementNode::new("div").with_text("Add a comment…"))
                .with_child(comments_box()),
        );
        let tree = DomTree::new(root);

        let located = locator().locate(&tree, input_of(&tree));
        assert_eq!(located.strategy, Some(ExtractStrategy::FilteredContainer));
        assert_eq!(
            located.text,
            "Jane Doe Product lead at Example Launch notes are up on the blog"
        );
    }

    #[test]
    fn test_filtered_container_truncates_to_cap() {
        let long_line = "word ".repeat(400);
        let root = ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_class("artdeco-card")
                .with_child(ElementNode::new("div").with_text(long_line.clone()))
                .with_child(ElementNode::new("div").with_text("Like  Reply  2w"))
                .with_child(comments_box()),
        );
        let tree = DomTree::new(root);

        let text = locator().extract_post_content(&tree, input_of(&tree));
        assert_eq!(text.chars().count(), MAX_CONTAINER_TEXT_CHARS);
        assert!(long_line.starts_with(&text));
        assert!(!text.contains("Reply"));
    }

    #[test]
    fn test_feed_scan_skips_own_item_and_noisy_items() {
        let root = ElementNode::new("body")
            .with_child(
                ElementNode::new("div")
                    .with_class("feed-shared-update-v2")
                    .with_child(ElementNode::new("p").with_text("Like this if you agree with me"))
            )
            .with_child(
                ElementNode::new("div")
                    .with_class("feed-shared-update-v2")
                    .with_child(ElementNode::new("p").with_text("Quarterly numbers are in and they look great")),
            )
            .with_child(ElementNode::new("aside").with_child(comments_box()));
        let tree = DomTree::new(root);
        let selectors = FeedSelectors::linkedin().unwrap();

        let text = ExtractStrategy::FeedScan.extract(&tree, input_of(&tree), None, &selectors);
        assert_eq!(text.as_deref(), Some("Quarterly numbers are in and they look great"));
    }

    #[test]
    fn test_feed_scan_keeps_items_mentioning_share() {
        let root = ElementNode::new("body")
            .with_child(
                ElementNode::new("div")
                    .with_class("feed-shared-update-v2")
                    .with_child(ElementNode::new("p").with_text("Excited to share our quarterly results with everyone")),
            )
            .with_child(ElementNode::new("aside").with_child(comments_box()));
        let tree = DomTree::new(root);

        let located = locator().locate(&tree, input_of(&tree));
        assert_eq!(located.strategy, Some(ExtractStrategy::FeedScan));
        assert_eq!(located.text, "Excited to share our quarterly results with everyone");
    }

    #[test]
    fn test_noise_lists_differ_on_share() {
        assert!(contains_noise("Share this post", NOISE_PHRASES));
        assert!(!contains_noise("Share this post", FEED_SCAN_NOISE));
        assert!(contains_noise("Add a comment…", FEED_SCAN_NOISE));
    }

    #[test]
    fn test_feed_scan_never_reads_own_container() {
        let root = ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_class("feed-shared-update-v2")
                .with_child(ElementNode::new("p").with_text("A perfectly clean post body text"))
                .with_child(comments_box()),
        );
        let tree = DomTree::new(root);
        let selectors = FeedSelectors::linkedin().unwrap();

        assert_eq!(ExtractStrategy::FeedScan.extract(&tree, input_of(&tree), None, &selectors), None);
    }

    #[test]
    fn test_nothing_found_is_empty() {
        let root = ElementNode::new("body").with_child(comments_box());
        let tree = DomTree::new(root);

        let located = locator().locate(&tree, input_of(&tree));
        assert!(located.is_empty());
        assert_eq!(located.strategy, None);
        assert_eq!(located.container, None);
    }
}
