use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A comment composer found on the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentInput {
    /// Live handle of the editable element
    pub handle: usize,

    /// Element's tag name
    pub tag_name: String,

    /// Placeholder or aria-label shown in the empty composer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Text currently typed into the composer (truncated for display)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CommentInput {
    pub fn new(handle: usize, tag_name: impl Into<String>) -> Self {
        Self {
            handle,
            tag_name: tag_name.into(),
            placeholder: None,
            text: None,
        }
    }

    /// Builder method: set placeholder
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Builder method: set current text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Comment inputs seen so far, keyed by a small index in discovery order.
///
/// An input is registered at most once no matter how many times the page is
/// rescanned.
#[derive(Debug, Clone, Default)]
pub struct InputRegistry {
    map: IndexMap<usize, CommentInput>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self { map: IndexMap::new() }
    }

    /// Register a composer; `None` when its handle is already known
    pub fn register(&mut self, input: CommentInput) -> Option<usize> {
        if self.find_by_handle(input.handle).is_some() {
            return None;
        }
        let index = self.map.len();
        self.map.insert(index, input);
        Some(index)
    }

    pub fn get(&self, index: usize) -> Option<&CommentInput> {
        self.map.get(&index)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn find_by_handle(&self, handle: usize) -> Option<usize> {
        self.map
            .iter()
            .find(|(_, input)| input.handle == handle)
            .map(|(idx, _)| *idx)
    }

    /// Export to JSON for listing on the command line
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.map)
    }
}
