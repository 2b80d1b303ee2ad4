//! Revealing truncated post text before extraction.

use crate::dom::{ElementRef, FeedSelectors, ancestors, handle, has_class, text_content};
use crate::page::PageHandle;
use log::{debug, warn};

/// Levels searched, the composer itself counting as the first
pub const EXPANSION_DEPTH: usize = 10;

/// Whether a candidate control actually reads as a "see more" toggle
fn is_see_more(el: ElementRef<'_>) -> bool {
    let text = text_content(el).to_lowercase();
    let aria_label = el
        .value()
        .attr("aria-label")
        .map(str::to_lowercase)
        .unwrap_or_default();

    text.contains("more") || text.contains('…') || aria_label.contains("see more") || has_class(el, "see-more")
}

/// Collect "see more" toggles around a composer.
///
/// Searches the composer and its ancestors, [`EXPANSION_DEPTH`] levels in
/// total, and returns each qualifying control once, nearest scope first.
pub fn find_see_more_toggles<'a>(input: ElementRef<'a>, selectors: &FeedSelectors) -> Vec<ElementRef<'a>> {
    let mut toggles: Vec<ElementRef<'a>> = Vec::new();
    let scopes = std::iter::once(input).chain(ancestors(input)).take(EXPANSION_DEPTH);

    for scope in scopes {
        for selector in &selectors.see_more {
            for candidate in scope.select(selector) {
                if !toggles.contains(&candidate) && is_see_more(candidate) {
                    toggles.push(candidate);
                }
            }
        }
    }
    toggles
}

/// Click every toggle, best effort. Returns how many clicks went through.
pub fn activate_toggles<P: PageHandle + ?Sized>(page: &P, toggles: &[ElementRef<'_>]) -> usize {
    let mut clicked = 0;
    for &toggle in toggles {
        let Some(id) = handle(toggle) else {
            debug!("Skipping see more toggle without a handle");
            continue;
        };
        match page.click(id) {
            Ok(()) => {
                debug!("Clicked see more toggle {}", id);
                clicked += 1;
            }
            Err(e) => warn!("Could not click see more toggle {}: {}", id, e),
        }
    }
    clicked
}

/// Find and click the toggles around `input` in one go
pub fn expand_see_more<P: PageHandle + ?Sized>(page: &P, input: ElementRef<'_>, selectors: &FeedSelectors) -> usize {
    let toggles = find_see_more_toggles(input, selectors);
    activate_toggles(page, &toggles)
}
