//! Unit tests for command classification and parameter extraction.

use bead_intercom::bot::classify::{classify, interpret};
use bead_intercom::config::ProjectCatalog;
use bead_intercom::models::intent::Intent;

#[test]
fn keywords_map_to_intents() {
    let cases = [
        ("help", Intent::Help),
        ("?", Intent::Help),
        ("commands", Intent::Help),
        ("ready", Intent::ShowReady),
        ("what's ready", Intent::ShowReady),
        ("whats ready", Intent::ShowReady),
        ("what is ready", Intent::ShowReady),
        ("show os-mjb", Intent::ShowItem),
        ("bead os-mjb", Intent::ShowItem),
        ("list", Intent::ListItems),
        ("list os", Intent::ListItems),
        ("claim os-mjb", Intent::ClaimItem),
        ("done os-mjb", Intent::CloseItem),
        ("close os-mjb fixed", Intent::CloseItem),
        ("projects", Intent::ListProjects),
        ("repos", Intent::ListProjects),
        ("status", Intent::ShowStatus),
        ("status website", Intent::ShowStatus),
    ];
    for (text, expected) in cases {
        assert_eq!(classify(text), expected, "input: {text:?}");
    }
}

#[test]
fn matching_ignores_case_and_outer_whitespace() {
    assert_eq!(classify("  HELP  "), Intent::Help);
    assert_eq!(classify("Ready"), Intent::ShowReady);
    assert_eq!(classify("LIST os"), Intent::ListItems);
}

#[test]
fn bare_item_key_means_show() {
    assert_eq!(classify("os-mjb"), Intent::ShowItem);
    assert_eq!(classify("what about os-mjb?"), Intent::ShowItem);
}

#[test]
fn keyword_needs_exact_match() {
    assert_eq!(classify("help me"), Intent::Unknown);
    assert_eq!(classify("ready now"), Intent::Unknown);
}

#[test]
fn prefix_commands_need_their_trailing_space() {
    assert_eq!(classify("claim"), Intent::Unknown);
    assert_eq!(classify("done"), Intent::Unknown);
}

#[test]
fn classify_is_total() {
    for text in ["", " ", "\n", "🤖", "<>", "---", "a-"] {
        let _ = classify(text);
    }
    assert_eq!(classify(""), Intent::Unknown);
}

#[test]
fn show_resolves_key_and_project() {
    let command = interpret("show os-mjb", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::ShowItem);
    assert_eq!(command.params.item_key.as_deref(), Some("os-mjb"));
    assert_eq!(command.params.project.as_deref(), Some("os"));
}

#[test]
fn close_with_reason() {
    let command = interpret("done galtrader-d0a shipped it", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::CloseItem);
    assert_eq!(command.params.item_key.as_deref(), Some("galtrader-d0a"));
    assert_eq!(command.params.reason.as_deref(), Some("shipped it"));
    assert_eq!(command.params.project.as_deref(), Some("galtrader"));
}

#[test]
fn close_without_reason() {
    let command = interpret("done galtrader-d0a", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::CloseItem);
    assert_eq!(command.params.item_key.as_deref(), Some("galtrader-d0a"));
    assert_eq!(command.params.reason, None);
}

#[test]
fn unknown_text() {
    let command = interpret("hello there", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::Unknown);
    assert_eq!(command.params, Default::default());
}

#[test]
fn mention_is_stripped_before_classifying() {
    let command = interpret("<at>Beads</at> claim 3dl-7", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::ClaimItem);
    assert_eq!(command.params.item_key.as_deref(), Some("3dl-7"));
    assert_eq!(command.params.project.as_deref(), Some("3dl"));
}

#[test]
fn list_extracts_project() {
    let command = interpret("list website", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::ListItems);
    assert_eq!(command.params.project.as_deref(), Some("website"));
}

#[test]
fn status_without_project() {
    let command = interpret("status", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::ShowStatus);
    assert_eq!(command.params.project, None);
}

#[test]
fn show_without_key_has_no_key() {
    let command = interpret("show me everything", &ProjectCatalog::default());
    assert_eq!(command.intent, Intent::ShowItem);
    assert_eq!(command.params.item_key, None);
}

#[test]
fn usage_hints_exist_for_item_intents() {
    for intent in [Intent::ShowItem, Intent::ClaimItem, Intent::CloseItem] {
        assert!(intent.requires_item_key());
        assert!(intent.usage().is_some());
    }
    assert!(!Intent::ListItems.requires_item_key());
    assert_eq!(Intent::Help.usage(), None);
}
