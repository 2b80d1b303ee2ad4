//! DOM snapshot and querying
//!
//! This module provides the page model the feed heuristics run on:
//! - DomTree: parsed `<body>` snapshot, queried with `scraper` selectors
//! - ElementNode: mutable element model behind in-memory pages
//! - FeedSelectors: the host feed's selector tables
//! - InputRegistry: comment composers discovered on the page

pub mod element;
pub mod registry;
pub mod selectors;
pub mod tree;

pub use element::{ElementNode, HANDLE_ATTRIBUTE};
pub use registry::{CommentInput, InputRegistry};
pub use scraper::{ElementRef, Selector};
pub use selectors::FeedSelectors;
pub use tree::{DomTree, ancestors, contains, handle, has_class, text_content};

/// Register every comment composer in `tree` not seen before; returns new indices
pub fn scan_comment_inputs(tree: &DomTree, selectors: &FeedSelectors, registry: &mut InputRegistry) -> Vec<usize> {
    tree.root()
        .select(&selectors.comment_input)
        .filter_map(|el| {
            let mut input = CommentInput::new(handle(el)?, el.value().name());
            if let Some(placeholder) = el
                .value()
                .attr("data-placeholder")
                .or_else(|| el.value().attr("aria-label"))
            {
                input = input.with_placeholder(placeholder);
            }
            let text = crate::text::normalize(&text_content(el));
            if !text.is_empty() {
                input = input.with_text(crate::text::truncate_chars(&text, 50));
            }
            registry.register(input)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer(label: &str) -> ElementNode {
        ElementNode::new("div")
            .with_attribute("contenteditable", "true")
            .with_attribute("aria-label", label)
    }

    #[test]
    fn test_scan_registers_each_composer_once() {
        let root = ElementNode::new("body")
            .with_child(ElementNode::new("div").with_child(composer("Add a comment…")))
            .with_child(ElementNode::new("div").with_child(composer("Comment on this post")))
            .with_child(ElementNode::new("div").with_attribute("contenteditable", "true"))
            .with_child(composer("Search").with_attribute("data-placeholder", "Search"));
        let tree = DomTree::new(root);
        let selectors = FeedSelectors::linkedin().unwrap();
        let mut registry = InputRegistry::new();

        let found = scan_comment_inputs(&tree, &selectors, &mut registry);
        assert_eq!(found, vec![0, 1]);
        assert_eq!(
            registry.get(0).unwrap().placeholder.as_deref(),
            Some("Add a comment…")
        );

        let again = scan_comment_inputs(&tree, &selectors, &mut registry);
        assert!(again.is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_scan_skips_unstamped_composers() {
        let tree = DomTree::parse(r#"<body><div contenteditable="true" aria-label="Add a comment…"></div></body>"#);
        let selectors = FeedSelectors::linkedin().unwrap();
        let mut registry = InputRegistry::new();

        assert!(scan_comment_inputs(&tree, &selectors, &mut registry).is_empty());
    }
}
