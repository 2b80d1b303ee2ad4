//! Cleanup of text scraped from the feed.
//!
//! [`normalize`] strips UI chrome the composer itself adds to the page (the mood
//! glyph strip, placeholder text, "see more"/"see less" toggles) and collapses
//! whitespace. Line breaks survive as single `\n` separators so later stages can
//! still filter line by line.

/// Substrings removed verbatim from scraped text
pub const NOISE_SUBSTRINGS: &[&str] = &[
    "👍👏💡🤔❤️✅🎯🚀",
    "Add a comment…",
    "…more",
    "see more",
    "see less",
];

/// Clean scraped page text.
///
/// Deterministic and idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    // Every pass either shortens the text or leaves it untouched. Removing a
    // marker or collapsing spaces can splice a new marker together, so repeat
    // until a pass changes nothing.
    let mut current = clean_pass(text);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    let mut stripped = text.to_string();
    for noise in NOISE_SUBSTRINGS {
        if stripped.contains(noise) {
            stripped = stripped.replace(noise, "");
        }
    }

    stripped
        .lines()
        .map(collapse_spaces)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse every run of whitespace in a single line to one space and trim
fn collapse_spaces(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
