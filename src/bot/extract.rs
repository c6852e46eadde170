//! Parameter extraction from free text.
//!
//! Everything here is pure: no I/O, no backend calls.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ProjectCatalog;

#[allow(clippy::expect_used)] // literal pattern, checked by tests
static ITEM_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z0-9]+-[a-z0-9]+)\b").expect("valid item key regex"));

// Teams wraps mentions in <at>…</at>; Slack uses <@U123> or <@U123|name>.
#[allow(clippy::expect_used)] // literal pattern, checked by tests
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<at>.*?</at>|<@[^>]*>").expect("valid mention regex"));

/// First whole-word item key (`prefix-suffix`) in the text.
///
/// Only lowercase letters and digits match; callers wanting case-insensitive
/// matching must lowercase first.
#[must_use]
pub fn extract_item_key(text: &str) -> Option<String> {
    ITEM_KEY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// First known project (in catalog order) mentioned anywhere in the text.
///
/// Matching is a case-insensitive substring test, so catalog order rather
/// than position in the text decides between several candidates.
#[must_use]
pub fn extract_project(text: &str, catalog: &ProjectCatalog) -> Option<String> {
    let lower = text.to_lowercase();
    catalog
        .known
        .iter()
        .find(|project| lower.contains(&project.to_lowercase()))
        .cloned()
}

/// Remove mention markers and surrounding whitespace.
#[must_use]
pub fn strip_mentions(text: &str) -> String {
    let mut current = text.to_owned();
    // Removing one marker can splice together another.
    while MENTION_RE.is_match(&current) {
        current = MENTION_RE.replace_all(&current, "").into_owned();
    }
    current.trim().to_owned()
}

/// Close reason following the item key, if the text carries one.
///
/// Requires at least three words (`done <key> <reason...>`); the reason is
/// whatever follows the first occurrence of the key.
#[must_use]
pub fn extract_close_reason(text: &str, item_key: &str) -> Option<String> {
    if text.split_whitespace().count() < 3 {
        return None;
    }
    let start = text.find(item_key)? + item_key.len();
    let reason = text[start..].trim();
    (!reason.is_empty()).then(|| reason.to_owned())
}

/// Project owning an item key, derived from the text before the first hyphen.
#[must_use]
pub fn project_for_key(item_key: &str, catalog: &ProjectCatalog) -> Option<String> {
    let prefix = item_key.split('-').next().unwrap_or(item_key);
    catalog.project_for_prefix(prefix).map(str::to_owned)
}
