use crate::dom::{DomTree, HANDLE_ATTRIBUTE};
use crate::error::{BrowserError, Result};
use crate::page::{Notification, PageHandle, NOTIFICATION_TTL};
use headless_chrome::{Element, Tab};
use std::sync::Arc;

/// [`PageHandle`] backed by a live tab.
///
/// Elements are addressed through the `data-bb-id` attribute the snapshot
/// script stamps on every element.
#[derive(Clone)]
pub struct TabPage {
    tab: Arc<Tab>,
}

fn handle_selector(handle: usize) -> String {
    format!("[{}=\"{}\"]", HANDLE_ATTRIBUTE, handle)
}

/// JS string literal for `value`
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn set_text_script(handle: usize, text: &str) -> String {
    format!(
        r#"(function() {{
    const el = document.querySelector({selector});
    if (!el) return false;
    el.textContent = {text};
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    return true;
}})()"#,
        selector = js_string(&handle_selector(handle)),
        text = js_string(text),
    )
}

fn busy_script(handle: usize, busy: bool) -> String {
    format!(
        r#"(function() {{
    const el = document.querySelector({selector});
    if (!el) return false;
    if ({busy}) {{ el.setAttribute('aria-busy', 'true'); }} else {{ el.removeAttribute('aria-busy'); }}
    return true;
}})()"#,
        selector = js_string(&handle_selector(handle)),
        busy = busy,
    )
}

fn notification_script(notification: &Notification) -> String {
    format!(
        r#"(function() {{
    const note = document.createElement('div');
    note.className = 'buzzblast-notification buzzblast-notification-{severity}';
    note.textContent = {message};
    note.style.cssText = 'position:fixed;top:20px;right:20px;z-index:10000;padding:12px 16px;' +
        'border-radius:8px;color:#fff;font-size:14px;box-shadow:0 4px 12px rgba(0,0,0,0.15);' +
        'background:{color};';
    document.body.appendChild(note);
    setTimeout(() => note.remove(), {ttl});
    return true;
}})()"#,
        severity = notification.severity.as_str(),
        message = js_string(&notification.message),
        color = notification.severity.color(),
        ttl = NOTIFICATION_TTL.as_millis(),
    )
}

impl TabPage {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    fn element(&self, handle: usize) -> Result<Element<'_>> {
        let selector = handle_selector(handle);
        self.tab
            .find_element(&selector)
            .map_err(|e| BrowserError::ElementNotFound(format!("Element '{}' not found: {}", selector, e)))
    }

    /// Evaluate a script that reports success as a boolean
    fn run_script(&self, script: &str, what: &str) -> Result<()> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::EvaluationFailed(format!("{}: {}", what, e)))?;

        match result.value.and_then(|v| v.as_bool()) {
            Some(true) => Ok(()),
            _ => Err(BrowserError::ElementNotFound(format!("{}: target element is gone", what))),
        }
    }
}

impl PageHandle for TabPage {
    fn snapshot(&self) -> Result<DomTree> {
        DomTree::from_tab(&self.tab)
    }

    fn click(&self, handle: usize) -> Result<()> {
        self.element(handle)?
            .click()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to click {}: {}", handle, e)))?;
        Ok(())
    }

    fn set_text(&self, handle: usize, text: &str) -> Result<()> {
        self.run_script(&set_text_script(handle, text), "Failed to set comment text")
    }

    fn focus(&self, handle: usize) -> Result<()> {
        self.element(handle)?
            .focus()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to focus {}: {}", handle, e)))?;
        Ok(())
    }

    fn set_busy(&self, handle: usize, busy: bool) -> Result<()> {
        self.run_script(&busy_script(handle, busy), "Failed to update busy state")
    }

    fn notify(&self, notification: &Notification) -> Result<()> {
        self.run_script(&notification_script(notification), "Failed to show notification")
    }
}
