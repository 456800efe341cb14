//! Text helpers for summary clean-up and log previews.
//!
//! - Markup removal for feed summaries (tag stripping only, entities untouched)
//! - Whitespace collapsing
//! - Character-based truncation with an ellipsis

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Remove HTML tags and collapse whitespace.
///
/// Each tag is replaced by a space so that adjacent block elements do not run
/// together, then every whitespace run becomes a single space and the result
/// is trimmed. This is a regex pass, not an HTML parser: entities such as
/// `&amp;` are left as they are.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_html("<p>Hello</p><p>world</p>"), "Hello world");
/// ```
pub fn strip_html(text: &str) -> String {
    let cleaned = TAG_RE.replace_all(text, " ");
    WS_RE.replace_all(&cleaned, " ").trim().to_string()
}

/// Cut `text` to `limit` characters, appending `…` when anything was removed.
///
/// The cut happens at exactly `limit` characters; the ellipsis is extra.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}…", &text[..byte_idx]),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}…(+{} bytes)", &s[..byte_idx], s.len() - byte_idx),
    }
}
