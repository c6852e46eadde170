//! Unit tests for item records, interaction payloads and documents.

use bead_intercom::models::document::{Action, Block, PresentationDocument, TextBlock};
use bead_intercom::models::interaction::InteractionPayload;
use bead_intercom::models::item::{is_closed_status, ItemRecord};
use serde_json::json;

#[test]
fn record_accessors_apply_fallbacks() {
    let record = ItemRecord::default();
    assert_eq!(record.display_key(), "?");
    assert_eq!(record.display_title(), "Untitled");
    assert_eq!(record.status(), "open");
    assert_eq!(record.assignee(), "unassigned");
    assert_eq!(record.item_type(), "task");
    assert_eq!(record.description(), "");
    assert_eq!(record.priority_label(), "?");
    assert_eq!(record.priority_level(), None);
}

#[test]
fn record_alternate_fields() {
    let record: ItemRecord = serde_json::from_value(json!({
        "key": "os-9",
        "summary": "Alt title",
        "type": "bug",
        "assignee": ""
    }))
    .expect("record");
    assert_eq!(record.display_key(), "os-9");
    assert_eq!(record.display_title(), "Alt title");
    assert_eq!(record.item_type(), "bug");
    assert_eq!(record.assignee(), "unassigned");
}

#[test]
fn priority_as_string_or_number() {
    let numeric: ItemRecord = serde_json::from_value(json!({"priority": 1})).expect("record");
    assert_eq!(numeric.priority_level(), Some(1));
    assert_eq!(numeric.priority_label(), "1");

    let text: ItemRecord = serde_json::from_value(json!({"priority": "2"})).expect("record");
    assert_eq!(text.priority_level(), Some(2));
    assert_eq!(text.priority_label(), "2");
}

#[test]
fn closed_statuses() {
    assert!(is_closed_status("closed"));
    assert!(is_closed_status("DONE"));
    assert!(!is_closed_status("in_progress"));
}

#[test]
fn payload_round_trips_through_button_value() {
    let payload = InteractionPayload::new("close", "os-1").with_field("close_reason", "fixed");
    let encoded = serde_json::to_string(&payload).expect("encode");
    assert_eq!(InteractionPayload::from_json(&encoded).expect("decode"), payload);
}

#[test]
fn blank_fields_read_as_missing() {
    let payload = InteractionPayload::new("close", "os-1").with_field("close_reason", "   ");
    assert_eq!(payload.field("close_reason"), None);
    assert_eq!(payload.field("absent"), None);
}

#[test]
fn action_payload_decodes_as_interaction() {
    let action = Action::for_item("Claim", "claim", "os-1");
    let encoded = serde_json::to_string(&action.payload).expect("encode");
    let payload = InteractionPayload::from_json(&encoded).expect("decode");
    assert_eq!(payload, InteractionPayload::new("claim", "os-1"));
}

#[test]
fn document_summary_is_first_text() {
    let mut doc = PresentationDocument::new();
    assert_eq!(doc.summary_text(), "");
    doc.push(Block::Facts { facts: Vec::new() });
    doc.push_text(TextBlock::new("first"));
    doc.push_text(TextBlock::new("second"));
    assert_eq!(doc.summary_text(), "first");
    assert!(doc.input().is_none());
}

#[test]
fn document_serializes_tagged_blocks() {
    let mut doc = PresentationDocument::new();
    doc.push_text(TextBlock::new("hi"));
    let value = serde_json::to_value(&doc).expect("encode");
    assert_eq!(value["blocks"][0]["type"], "text");
    assert_eq!(value["blocks"][0]["text"], "hi");
}
