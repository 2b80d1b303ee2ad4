//! One compose cycle: expand the post, read it, ask the model, write the reply.
//!
//! A [`CommentSession`] belongs to one page. It owns the in-flight flag shared
//! by every comment input on that page, the mood selection and a live view of
//! the settings.

use crate::dom::{DomTree, ElementRef, FeedSelectors, text_content};
use crate::error::{BrowserError, ComposeError, Result};
use crate::expand::expand_see_more;
use crate::generation::CommentGenerator;
use crate::locate::PostLocator;
use crate::mood::{Mood, MoodSelector};
use crate::page::{lock, Notification, PageHandle};
use crate::prompt::{GenerationRequest, DEFAULT_USER_INSTRUCTION};
use crate::settings::Settings;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

/// Shown when the user asks for a comment before configuring a key
pub const MISSING_KEY_MESSAGE: &str =
    "Oops! You need to set your API key first. Check the extension settings! 🔑";

/// Default pause after clicking "see more" so the page can render the text
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerOptions {
    pub settle_delay: Duration,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl ComposerOptions {
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

/// Where a session is in its compose cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeState {
    #[default]
    Idle,
    Expanding,
    Extracting,
    Prompting,
    Generating,
    Applying,
}

/// How a compose request ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// The generated comment now fills the input
    Applied(String),
    /// Another cycle was already running; nothing happened
    Skipped,
}

/// Per-page composer context
pub struct CommentSession<G> {
    generator: G,
    locator: PostLocator,
    settings: watch::Receiver<Settings>,
    options: ComposerOptions,
    moods: Mutex<MoodSelector>,
    state: Mutex<ComposeState>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag, the busy marker and the state on every exit path
struct InFlightGuard<'a, P: PageHandle + ?Sized> {
    flag: &'a AtomicBool,
    state: &'a Mutex<ComposeState>,
    page: &'a P,
    handle: usize,
}

impl<'a, P: PageHandle + ?Sized> InFlightGuard<'a, P> {
    fn acquire(flag: &'a AtomicBool, state: &'a Mutex<ComposeState>, page: &'a P, handle: usize) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag,
                state,
                page,
                handle,
            })
    }
}

impl<P: PageHandle + ?Sized> Drop for InFlightGuard<'_, P> {
    fn drop(&mut self) {
        if let Err(e) = self.page.set_busy(self.handle, false) {
            warn!("Could not clear busy state on {}: {}", self.handle, e);
        }
        *lock(self.state) = ComposeState::Idle;
        self.flag.store(false, Ordering::Release);
    }
}

impl<G: CommentGenerator> CommentSession<G> {
    /// Session using the LinkedIn selector tables
    pub fn new(generator: G, settings: watch::Receiver<Settings>) -> Result<Self> {
        Ok(Self::with_locator(
            generator,
            settings,
            PostLocator::new(FeedSelectors::linkedin()?),
        ))
    }

    pub fn with_locator(generator: G, settings: watch::Receiver<Settings>, locator: PostLocator) -> Self {
        Self {
            generator,
            locator,
            settings,
            options: ComposerOptions::default(),
            moods: Mutex::new(MoodSelector::new()),
            state: Mutex::new(ComposeState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn options(mut self, options: ComposerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> ComposeState {
        *lock(&self.state)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Select or deselect a mood; returns the selection afterwards
    pub fn toggle_mood(&self, mood: Mood) -> Option<Mood> {
        let selected = lock(&self.moods).toggle(mood);
        debug!("Selected mood: {:?}", selected);
        selected
    }

    pub fn selected_mood(&self) -> Option<Mood> {
        lock(&self.moods).selected()
    }

    pub fn locator(&self) -> &PostLocator {
        &self.locator
    }

    fn set_state(&self, state: ComposeState) {
        debug!("Compose state: {:?}", state);
        *lock(&self.state) = state;
    }

    /// Run one compose cycle for the input with `input_handle`.
    ///
    /// Returns [`ComposeOutcome::Skipped`] when a cycle is already running on
    /// this page. A missing key is reported on the page; every other failure is
    /// only logged and leaves the input as it was.
    pub async fn compose<P: PageHandle + ?Sized>(
        &self,
        page: &P,
        input_handle: usize,
    ) -> std::result::Result<ComposeOutcome, ComposeError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &self.state, page, input_handle) else {
            debug!("Compose already in flight, ignoring request for {}", input_handle);
            return Ok(ComposeOutcome::Skipped);
        };

        let settings = self.settings.borrow().clone();
        let Some(api_key) = settings.api_key().map(str::to_string) else {
            if let Err(e) = page.notify(&Notification::error(MISSING_KEY_MESSAGE)) {
                warn!("Could not show notification: {}", e);
            }
            return Err(ComposeError::MissingCredential);
        };

        match self.run(page, input_handle, &settings, &api_key).await {
            Ok(text) => Ok(ComposeOutcome::Applied(text)),
            Err(e) => {
                error!("Error generating comment: {}", e);
                Err(e)
            }
        }
    }

    async fn run<P: PageHandle + ?Sized>(
        &self,
        page: &P,
        input_handle: usize,
        settings: &Settings,
        api_key: &str,
    ) -> std::result::Result<String, ComposeError> {
        page.set_busy(input_handle, true)?;

        self.set_state(ComposeState::Expanding);
        let user_instruction = {
            let tree = page.snapshot()?;
            let input = find_input(&tree, input_handle)?;
            let clicked = expand_see_more(page, input, self.locator.selectors());
            debug!("Activated {} see more toggles", clicked);
            match text_content(input).trim() {
                "" => DEFAULT_USER_INSTRUCTION.to_string(),
                text => text.to_string(),
            }
        };
        tokio::time::sleep(self.options.settle_delay).await;

        self.set_state(ComposeState::Extracting);
        let post_content = {
            let tree = page.snapshot()?;
            let input = find_input(&tree, input_handle)?;
            self.locator.extract_post_content(&tree, input)
        };
        if post_content.is_empty() {
            return Err(ComposeError::NoContentFound);
        }

        self.set_state(ComposeState::Prompting);
        let request = GenerationRequest {
            user_instruction: Some(user_instruction),
            post_content,
            mood: lock(&self.moods).tone().to_string(),
            length: settings.comment_length,
        };
        let prompt = request.build_prompt();

        self.set_state(ComposeState::Generating);
        let comment = self.generator.generate(&prompt, api_key).await?;

        self.set_state(ComposeState::Applying);
        page.set_text(input_handle, &comment)?;
        page.focus(input_handle)?;
        info!("Applied generated comment to input {} ({} chars)", input_handle, comment.chars().count());
        Ok(comment)
    }
}

fn find_input(tree: &DomTree, handle: usize) -> Result<ElementRef<'_>> {
    tree.find_by_handle(handle)
        .ok_or_else(|| BrowserError::ElementNotFound(format!("comment input {} is gone", handle)))
}
