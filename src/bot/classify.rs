//! Command classification.
//!
//! Rules are checked in order and the first match wins. The rule table is
//! small and fixed, so it stays a plain chain of matches rather than a
//! grammar.

use super::extract::{
    extract_close_reason, extract_item_key, extract_project, project_for_key, strip_mentions,
};
use crate::config::ProjectCatalog;
use crate::models::intent::{Classification, ExtractedParameters, Intent};

const HELP_WORDS: &[&str] = &["help", "?", "commands"];
const READY_WORDS: &[&str] = &["ready", "what's ready", "whats ready", "what is ready"];
const PROJECT_WORDS: &[&str] = &["projects", "repos"];
const SHOW_PREFIXES: &[&str] = &["show ", "bead "];
const CLOSE_PREFIXES: &[&str] = &["done ", "close "];

/// Map command text to an [`Intent`].
///
/// Total: every input, including the empty string, maps to exactly one
/// intent. Matching runs on the trimmed, lower-cased text; the final
/// fallback looks for an item key in the original text.
#[must_use]
pub fn classify(text: &str) -> Intent {
    let normalized = text.trim().to_lowercase();
    let lower = normalized.as_str();
    let starts_with_any = |prefixes: &[&str]| prefixes.iter().any(|p| lower.starts_with(p));

    if HELP_WORDS.contains(&lower) {
        Intent::Help
    } else if READY_WORDS.contains(&lower) {
        Intent::ShowReady
    } else if starts_with_any(SHOW_PREFIXES) {
        Intent::ShowItem
    } else if lower.starts_with("list") {
        Intent::ListItems
    } else if lower.starts_with("claim ") {
        Intent::ClaimItem
    } else if starts_with_any(CLOSE_PREFIXES) {
        Intent::CloseItem
    } else if PROJECT_WORDS.contains(&lower) {
        Intent::ListProjects
    } else if lower.starts_with("status") {
        Intent::ShowStatus
    } else if extract_item_key(text).is_some() {
        Intent::ShowItem
    } else {
        Intent::Unknown
    }
}

/// Strip mentions, classify, and extract the parameters the intent needs.
#[must_use]
pub fn interpret(raw: &str, catalog: &ProjectCatalog) -> Classification {
    let text = strip_mentions(raw);
    let intent = classify(&text);
    let mut params = ExtractedParameters::default();

    match intent {
        Intent::ShowItem | Intent::ClaimItem => {
            params.item_key = extract_item_key(&text);
        }
        Intent::CloseItem => {
            params.item_key = extract_item_key(&text);
            params.reason = params
                .item_key
                .as_deref()
                .and_then(|key| extract_close_reason(&text, key));
        }
        Intent::ListItems | Intent::ShowStatus => {
            params.project = extract_project(&text, catalog);
        }
        Intent::Help | Intent::ShowReady | Intent::ListProjects | Intent::Unknown => {}
    }

    if let Some(key) = params.item_key.as_deref() {
        params.project = project_for_key(key, catalog);
    }

    Classification { intent, params }
}
