use crate::dom::element::{ElementNode, HANDLE_ATTRIBUTE};
use crate::error::{BrowserError, Result};
use headless_chrome::Tab;
use scraper::{ElementRef, Html, Node};
use std::sync::Arc;

/// Tags rendered inline; everything else starts a new line in [`text_content`]
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "button", "cite", "code", "em", "i", "img", "kbd", "label", "mark",
    "q", "s", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// Tags whose content never shows up as text
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Parsed snapshot of a page's `<body>`.
///
/// Every feed heuristic runs against this tree, never against the live page.
/// Elements carry a stable handle (`data-bb-id`) so the page side can address
/// the same element again after the heuristics pick it.
#[derive(Debug, Clone)]
pub struct DomTree {
    html: Html,
}

impl DomTree {
    /// Render a fixture and parse it, handing out handles where missing
    pub fn new(mut root: ElementNode) -> Self {
        root.assign_handles();
        Self::parse(&root.to_html())
    }

    /// Parse body markup as captured by the snapshot script
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Build DOM tree from a browser tab
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("snapshot_dom.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| BrowserError::DomParseFailed(format!("Failed to execute DOM snapshot script: {}", e)))?;

        let value = result
            .value
            .ok_or_else(|| BrowserError::DomParseFailed("No value returned from DOM snapshot".to_string()))?;

        let markup: String = serde_json::from_value(value)
            .map_err(|e| BrowserError::DomParseFailed(format!("Snapshot is not a string: {}", e)))?;

        Ok(Self::parse(&markup))
    }

    /// The `<body>` element
    pub fn root(&self) -> ElementRef<'_> {
        let html = self.html.root_element();
        html.children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .unwrap_or(html)
    }

    /// Elements under the root, the root included
    pub fn len(&self) -> usize {
        self.elements().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements under the root in document order, the root first
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.root().descendants().filter_map(ElementRef::wrap)
    }

    /// Find the element stamped with `wanted`
    pub fn find_by_handle(&self, wanted: usize) -> Option<ElementRef<'_>> {
        self.elements().find(|&el| handle(el) == Some(wanted))
    }

    /// Find the element whose `id` attribute equals `dom_id`
    pub fn get_element_by_id(&self, dom_id: &str) -> Option<ElementRef<'_>> {
        self.elements().find(|el| el.value().id() == Some(dom_id))
    }

    /// Markup of the root element
    pub fn html(&self) -> String {
        self.root().html()
    }
}

/// Stable handle of an element, if the snapshot stamped one
pub fn handle(el: ElementRef<'_>) -> Option<usize> {
    el.value().attr(HANDLE_ATTRIBUTE)?.parse().ok()
}

pub fn has_class(el: ElementRef<'_>, class_name: &str) -> bool {
    el.value().classes().any(|c| c == class_name)
}

/// Element ancestors from the parent upwards (`parentElement` chain)
pub fn ancestors(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

/// Whether `node` is `ancestor` or lies inside it (`Node.contains`)
pub fn contains(ancestor: ElementRef<'_>, node: ElementRef<'_>) -> bool {
    node.id() == ancestor.id() || node.ancestors().any(|a| a.id() == ancestor.id())
}

/// Rendered text of a subtree.
///
/// Block elements are separated by line breaks, inline elements and text runs
/// are concatenated, `hidden` subtrees and scripts are skipped.
pub fn text_content(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    write_text(el, &mut out);
    out
}

fn write_text(el: ElementRef<'_>, out: &mut String) {
    let element = el.value();
    let name = element.name();
    if element.attr("hidden").is_some() || SKIPPED_TAGS.contains(&name) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    let block = !INLINE_TAGS.contains(&name);
    if block {
        out.push('\n');
    }
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_text(child, out);
                }
            }
            _ => {}
        }
    }
    if block {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    fn create_test_tree() -> DomTree {
        let root = ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_class("feed-shared-update-v2")
                .with_child(
                    ElementNode::new("div")
                        .with_class("feed-shared-inline-show-more-text")
                        .with_child(ElementNode::new("span").with_text("Hello "))
                        .with_child(ElementNode::new("strong").with_text("world"))
                        .with_child(ElementNode::new("button").with_text("…more")),
                )
                .with_child(
                    ElementNode::new("div")
                        .with_class("comments")
                        .with_child(
                            ElementNode::new("div")
                                .with_attribute("contenteditable", "true")
                                .with_attribute("id", "box"),
                        ),
                ),
        );
        DomTree::new(root)
    }

    #[test]
    fn test_every_element_gets_a_handle() {
        let tree = create_test_tree();
        assert_eq!(tree.len(), 8);
        assert!(tree.elements().all(|el| handle(el).is_some()));
        assert_eq!(tree.root().value().name(), "body");

        let boxed = tree.get_element_by_id("box").unwrap();
        assert_eq!(tree.find_by_handle(handle(boxed).unwrap()), Some(boxed));
        assert_eq!(tree.find_by_handle(10_000), None);
    }

    #[test]
    fn test_ancestors_and_contains() {
        let tree = create_test_tree();
        let input = tree.get_element_by_id("box").unwrap();
        let chain: Vec<_> = ancestors(input).map(|el| el.value().name().to_string()).collect();
        assert_eq!(chain, vec!["div", "div", "body", "html"]);

        let comments = ancestors(input).next().unwrap();
        assert!(contains(tree.root(), input));
        assert!(contains(comments, input));
        assert!(contains(input, input));
        assert!(!contains(input, comments));
    }

    #[test]
    fn test_select_is_scoped_to_descendants() {
        let tree = create_test_tree();
        let card = tree.root().select(&sel(".feed-shared-update-v2")).next().unwrap();
        assert!(card.select(&sel(".feed-shared-update-v2")).next().is_none());
        assert!(sel("div.feed-shared-update-v2").matches(&card));

        assert_eq!(card.select(&sel(".feed-shared-inline-show-more-text button")).count(), 1);
        assert!(card.select(&sel(".comments button")).next().is_none());
    }

    #[test]
    fn test_text_content_layout() {
        let tree = create_test_tree();
        let text = text_content(tree.root());
        let lines: Vec<_> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines, vec!["Hello world…more"]);
    }

    #[test]
    fn test_text_runs_hidden_and_scripts() {
        let root = ElementNode::new("p")
            .with_child(ElementNode::text("Ship"))
            .with_child(ElementNode::new("b").with_text("ped"))
            .with_child(ElementNode::new("span").with_attribute("hidden", "").with_text(" secret"))
            .with_child(ElementNode::new("script").with_text("track()"))
            .with_child(ElementNode::text(" it"))
            .with_child(ElementNode::new("br"))
            .with_child(ElementNode::text("again"));
        let tree = DomTree::new(root);
        let p = tree.root().select(&sel("p")).next().unwrap();

        assert_eq!(text_content(p).trim(), "Shipped it\nagain");
    }

    #[test]
    fn test_parse_live_markup() {
        let tree = DomTree::parse(
            r#"<body data-bb-id="1"><div data-bb-id="2" class="feed-shared-text">We shipped <b data-bb-id="3">v2</b></div></body>"#,
        );
        assert_eq!(handle(tree.root()), Some(1));
        let div = tree.find_by_handle(2).unwrap();
        assert!(has_class(div, "feed-shared-text"));
        assert!(!has_class(div, "feed-shared"));
        assert_eq!(text_content(div).trim(), "We shipped v2");
        assert!(tree.html().starts_with("<body"));
    }
}
