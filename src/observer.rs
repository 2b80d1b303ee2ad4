//! Document-change subscriptions.
//!
//! Feeds load comment composers lazily, so the page is re-scanned whenever the
//! document changes. [`DocumentEvents`] fans each fresh snapshot out to its
//! subscribers; [`CommentInputWatcher`] is the subscriber that keeps the input
//! registry current. [`watch_document`] produces the change events by polling
//! a [`PageHandle`].

use crate::dom::{CommentInput, DomTree, FeedSelectors, InputRegistry, handle, scan_comment_inputs, text_content};
use crate::page::PageHandle;
use log::{debug, info, warn};
use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

/// Default polling interval for [`watch_document`]
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Something interested in document changes
pub trait DocumentObserver {
    fn document_changed(&mut self, tree: &DomTree);
}

impl<F: FnMut(&DomTree)> DocumentObserver for F {
    fn document_changed(&mut self, tree: &DomTree) {
        self(tree)
    }
}

/// Returned by [`DocumentEvents::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// Subscribers to document changes, notified in subscription order
#[derive(Default)]
pub struct DocumentEvents<'a> {
    observers: Vec<(SubscriptionId, Box<dyn DocumentObserver + 'a>)>,
    next_id: usize,
}

impl<'a> DocumentEvents<'a> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self, observer: impl DocumentObserver + 'a) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, tree: &DomTree) {
        for (_, observer) in &mut self.observers {
            observer.document_changed(tree);
        }
    }
}

/// Keeps an [`InputRegistry`] in sync with the document
#[derive(Debug, Clone)]
pub struct CommentInputWatcher {
    selectors: FeedSelectors,
    registry: InputRegistry,
    discovered: Vec<usize>,
}

impl CommentInputWatcher {
    pub fn new(selectors: FeedSelectors) -> Self {
        Self {
            selectors,
            registry: InputRegistry::new(),
            discovered: Vec::new(),
        }
    }

    pub fn registry(&self) -> &InputRegistry {
        &self.registry
    }

    /// Inputs found since the last call, in discovery order
    pub fn take_discovered(&mut self) -> Vec<CommentInput> {
        std::mem::take(&mut self.discovered)
            .into_iter()
            .filter_map(|index| self.registry.get(index).cloned())
            .collect()
    }
}

impl DocumentObserver for CommentInputWatcher {
    fn document_changed(&mut self, tree: &DomTree) {
        let found = scan_comment_inputs(tree, &self.selectors, &mut self.registry);
        if !found.is_empty() {
            debug!("Found {} new comment inputs", found.len());
        }
        self.discovered.extend(found);
    }
}

/// Change signature of a snapshot: element structure plus rendered text.
///
/// New elements always carry new handles, which is what input discovery cares
/// about; attribute-only changes are not seen.
fn fingerprint(tree: &DomTree) -> u64 {
    let mut hasher = DefaultHasher::new();
    for el in tree.elements() {
        handle(el).hash(&mut hasher);
        el.value().name().hash(&mut hasher);
    }
    text_content(tree.root()).hash(&mut hasher);
    hasher.finish()
}

/// Poll `page` and publish every changed snapshot until `shutdown` resolves.
///
/// The first snapshot is always published. Snapshot failures are logged and
/// polling continues.
pub async fn watch_document<P, S>(
    page: &P,
    events: &mut DocumentEvents<'_>,
    interval: Duration,
    shutdown: S,
) where
    P: PageHandle + ?Sized,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut last: Option<u64> = None;

    loop {
        match page.snapshot() {
            Ok(tree) => {
                let signature = fingerprint(&tree);
                if last != Some(signature) {
                    last = Some(signature);
                    events.publish(&tree);
                }
            }
            Err(e) => warn!("Snapshot failed: {}", e),
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!("Document watch stopped");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
