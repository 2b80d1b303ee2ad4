use std::collections::BTreeMap;

/// Tag used for bare text runs between elements
const TEXT_NODE_TAG: &str = "#text";

/// Attribute carrying the stable element handle in rendered markup
pub const HANDLE_ATTRIBUTE: &str = "data-bb-id";

/// Elements that must not get a closing tag
const VOID_TAGS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr"];

/// Mutable element model for in-memory pages.
///
/// Fixtures are written in this form and rendered to HTML, so every snapshot
/// goes through the same parser as a live page.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag_name: String,

    /// Attributes in a stable order, so rendering is deterministic
    pub attributes: BTreeMap<String, String>,

    /// Text owned directly by this element, rendered before the children
    pub text_content: Option<String>,

    pub children: Vec<ElementNode>,

    /// Stable handle rendered as `data-bb-id`
    pub handle: Option<usize>,
}

impl ElementNode {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            text_content: None,
            children: Vec::new(),
            handle: None,
        }
    }

    /// A bare text run
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(TEXT_NODE_TAG).with_text(text)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attribute("class", class)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_handle(mut self, handle: usize) -> Self {
        self.handle = Some(handle);
        self
    }

    fn is_text(&self) -> bool {
        self.tag_name == TEXT_NODE_TAG
    }

    /// Give every element without a handle a fresh one, above any handle
    /// already in use
    pub fn assign_handles(&mut self) {
        let mut next = self.max_handle().map_or(1, |max| max + 1);
        self.assign_from(&mut next);
    }

    fn max_handle(&self) -> Option<usize> {
        self.children
            .iter()
            .filter_map(ElementNode::max_handle)
            .chain(self.handle)
            .max()
    }

    fn assign_from(&mut self, next: &mut usize) {
        if !self.is_text() && self.handle.is_none() {
            self.handle = Some(*next);
            *next += 1;
        }
        for child in &mut self.children {
            child.assign_from(next);
        }
    }

    /// Element carrying `handle`, this one included
    pub fn find_by_handle_mut(&mut self, handle: usize) -> Option<&mut ElementNode> {
        if self.handle == Some(handle) && !self.is_text() {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_by_handle_mut(handle))
    }

    /// Element whose `id` attribute is `dom_id`, this one included
    pub fn find_by_id_mut(&mut self, dom_id: &str) -> Option<&mut ElementNode> {
        if self.attributes.get("id").is_some_and(|id| id == dom_id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_by_id_mut(dom_id))
    }

    /// Replace the content with plain text (`textContent = ...`)
    pub fn replace_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.text_content = Some(text.into());
    }

    /// Serialize to HTML markup
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        if self.is_text() {
            if let Some(text) = &self.text_content {
                escape_into(text, false, out);
            }
            return;
        }

        out.push('<');
        out.push_str(&self.tag_name);
        if let Some(handle) = self.handle {
            out.push_str(&format!(" {}=\"{}\"", HANDLE_ATTRIBUTE, handle));
        }
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        out.push('>');

        if VOID_TAGS.iter().any(|tag| self.tag_name.eq_ignore_ascii_case(tag)) {
            return;
        }
        if let Some(text) = &self.text_content {
            escape_into(text, false, out);
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag_name);
        out.push('>');
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
