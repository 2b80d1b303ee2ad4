//! Chrome/Chromium control over the DevTools Protocol

pub mod config;
pub mod session;
pub mod tab_page;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
pub use tab_page::TabPage;
