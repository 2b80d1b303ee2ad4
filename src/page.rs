//! The side-effect boundary between the composer and a page.
//!
//! Heuristics only ever read a [`DomTree`] snapshot. Everything that changes the
//! page (clicking a toggle, writing the comment, showing a notice) goes through
//! [`PageHandle`], addressed by the stable handles found in the snapshot.

use crate::dom::{DomTree, ElementNode, handle, text_content};
use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long an on-page notice stays visible
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Severity of an on-page notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Success,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Success => "success",
        }
    }

    /// Background colour of the notice
    pub fn color(self) -> &'static str {
        match self {
            Self::Error => "#dc3545",
            Self::Success => "#28a745",
        }
    }
}

/// A transient message shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }
}

/// Operations the composer performs on a page
pub trait PageHandle {
    /// Take a fresh snapshot of the document
    fn snapshot(&self) -> Result<DomTree>;

    /// Activate the element with this handle
    fn click(&self, handle: usize) -> Result<()>;

    /// Replace an element's content with plain text
    fn set_text(&self, handle: usize, text: &str) -> Result<()>;

    /// Move keyboard focus to an element
    fn focus(&self, handle: usize) -> Result<()>;

    /// Show or clear the busy state of the composer's action control
    fn set_busy(&self, handle: usize, busy: bool) -> Result<()>;

    /// Show a transient notice
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Side effects recorded by [`FixturePage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Clicked(usize),
    TextSet { handle: usize, text: String },
    Focused(usize),
    Busy { handle: usize, busy: bool },
    Notified(Notification),
}

/// An in-memory page built from an element tree.
///
/// Every snapshot renders the current tree to HTML and parses it again.
/// Clicking an element with `aria-controls` un-hides the controlled element,
/// which is how the fixture models "see more" toggles.
#[derive(Debug)]
pub struct FixturePage {
    root: Mutex<ElementNode>,
    events: Mutex<Vec<PageEvent>>,
    failing_clicks: Mutex<HashSet<usize>>,
}

impl FixturePage {
    pub fn new(mut root: ElementNode) -> Self {
        root.assign_handles();
        Self {
            root: Mutex::new(root),
            events: Mutex::new(Vec::new()),
            failing_clicks: Mutex::new(HashSet::new()),
        }
    }

    /// Make clicks on `handle` fail
    pub fn fail_clicks_on(&self, handle: usize) {
        lock(&self.failing_clicks).insert(handle);
    }

    /// Side effects applied so far, oldest first
    pub fn events(&self) -> Vec<PageEvent> {
        lock(&self.events).clone()
    }

    /// Notices shown so far
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PageEvent::Notified(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current rendered text of the element with `dom_id`
    pub fn text_of(&self, dom_id: &str) -> Option<String> {
        let tree = self.render();
        tree.get_element_by_id(dom_id).map(text_content)
    }

    /// Handle of the element with `dom_id`
    pub fn handle_of(&self, dom_id: &str) -> Option<usize> {
        let tree = self.render();
        tree.get_element_by_id(dom_id).and_then(handle)
    }

    fn render(&self) -> DomTree {
        DomTree::parse(&lock(&self.root).to_html())
    }

    fn record(&self, event: PageEvent) {
        lock(&self.events).push(event);
    }
}

fn missing(handle: usize) -> BrowserError {
    BrowserError::ElementNotFound(format!("No element with handle {}", handle))
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not hide the recorded state from the others
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PageHandle for FixturePage {
    fn snapshot(&self) -> Result<DomTree> {
        Ok(self.render())
    }

    fn click(&self, handle: usize) -> Result<()> {
        if lock(&self.failing_clicks).contains(&handle) {
            return Err(BrowserError::ElementNotFound(format!("element {} is detached", handle)));
        }

        {
            let mut root = lock(&self.root);
            let target = root
                .find_by_handle_mut(handle)
                .ok_or_else(|| missing(handle))?
                .attributes
                .get("aria-controls")
                .cloned();
            let mut expanded = false;
            if let Some(target) = target {
                if let Some(controlled) = root.find_by_id_mut(&target) {
                    controlled.attributes.remove("hidden");
                    expanded = true;
                }
            }
            if expanded {
                if let Some(toggle) = root.find_by_handle_mut(handle) {
                    toggle.attributes.insert("aria-expanded".to_string(), "true".to_string());
                }
            }
        }

        self.record(PageEvent::Clicked(handle));
        Ok(())
    }

    fn set_text(&self, handle: usize, text: &str) -> Result<()> {
        lock(&self.root)
            .find_by_handle_mut(handle)
            .ok_or_else(|| missing(handle))?
            .replace_text(text);
        self.record(PageEvent::TextSet {
            handle,
            text: text.to_string(),
        });
        Ok(())
    }

    fn focus(&self, handle: usize) -> Result<()> {
        lock(&self.root)
            .find_by_handle_mut(handle)
            .ok_or_else(|| missing(handle))?;
        self.record(PageEvent::Focused(handle));
        Ok(())
    }

    fn set_busy(&self, handle: usize, busy: bool) -> Result<()> {
        self.record(PageEvent::Busy { handle, busy });
        Ok(())
    }

    fn notify(&self, notification: &Notification) -> Result<()> {
        self.record(PageEvent::Notified(notification.clone()));
        Ok(())
    }
}
