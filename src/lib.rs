//! # buzzblast
//!
//! Mood-aware comment drafting for LinkedIn, driven over the Chrome DevTools
//! Protocol.
//!
//! ## How it works
//!
//! For a comment composer on the page, a compose cycle
//!
//! 1. clicks any "see more" toggles around the composer,
//! 2. snapshots the DOM and finds the text of the post the composer belongs to,
//! 3. builds an instruction from that text, the selected mood, the preferred
//!    length and whatever the user already typed,
//! 4. asks Gemini for a comment and writes it into the composer.
//!
//! All feed heuristics run on an owned [`DomTree`] snapshot. Side effects go
//! through [`PageHandle`], implemented by [`TabPage`] for a live tab and by
//! [`FixturePage`] for in-memory pages.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use buzzblast::{
//!     BrowserSession, CommentInputWatcher, CommentSession, DocumentObserver, FeedSelectors, GeminiClient,
//!     LaunchOptions, Mood, PageHandle, SettingsStore,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = SettingsStore::open(SettingsStore::default_path()?).await?;
//! let browser = BrowserSession::launch(LaunchOptions::new().headless(false))?;
//! browser.navigate("https://www.linkedin.com/feed/")?;
//! browser.wait_for_navigation()?;
//!
//! let page = browser.page()?;
//! let session = CommentSession::new(GeminiClient::default(), settings.subscribe())?;
//! session.toggle_mood(Mood::CuriousCat);
//!
//! let mut watcher = CommentInputWatcher::new(FeedSelectors::linkedin()?);
//! watcher.document_changed(&page.snapshot()?);
//! if let Some(input) = watcher.take_discovered().first() {
//!     session.compose(&page, input.handle).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`text`]: normalizing scraped text
//! - [`dom`]: `scraper`-parsed snapshots, selector tables and the comment-input registry
//! - [`locate`]: finding the post behind a composer
//! - [`expand`]: revealing truncated posts
//! - [`mood`] and [`prompt`]: what the model is asked for
//! - [`generation`]: the Gemini client
//! - [`settings`]: API key and length preference
//! - [`page`], [`browser`]: the page seam and its CDP implementation
//! - [`observer`]: document-change subscriptions
//! - [`composer`]: the compose cycle

pub mod browser;
pub mod composer;
pub mod dom;
pub mod error;
pub mod expand;
pub mod generation;
pub mod locate;
pub mod mood;
pub mod observer;
pub mod page;
pub mod prompt;
pub mod settings;
pub mod text;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions, TabPage};
pub use composer::{CommentSession, ComposeOutcome, ComposeState, ComposerOptions};
pub use dom::{CommentInput, DomTree, ElementNode, ElementRef, FeedSelectors, InputRegistry, Selector};
pub use error::{BrowserError, ComposeError, Result, SettingsError};
pub use generation::{CommentGenerator, GeminiClient, GeminiConfig};
pub use locate::PostLocator;
pub use mood::{Mood, MoodSelector};
pub use observer::{CommentInputWatcher, DocumentEvents, DocumentObserver};
pub use page::{FixturePage, Notification, PageHandle, Severity};
pub use prompt::{build_prompt, GenerationRequest, LengthPreference};
pub use settings::{Settings, SettingsStore};
