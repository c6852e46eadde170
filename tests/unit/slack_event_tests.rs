//! Unit tests for Slack event decoding helpers.

use std::collections::BTreeMap;

use bead_intercom::slack::events::{
    answers_message_event, is_direct_message, payload_from_action, payload_from_submission,
};
use bead_intercom::slack::ReplyTarget;

#[test]
fn button_value_carries_payload() {
    let payload = payload_from_action("claim", Some(r#"{"action":"claim","item_key":"os-1"}"#))
        .expect("payload");
    assert_eq!(payload.action, "claim");
    assert_eq!(payload.item_key, "os-1");
}

#[test]
fn action_id_fills_missing_tag() {
    let payload = payload_from_action("close", Some(r#"{"item_key":"os-1"}"#)).expect("payload");
    assert_eq!(payload.action, "close");
}

#[test]
fn undecodable_value_is_dropped() {
    assert!(payload_from_action("claim", Some("not json")).is_none());
}

#[test]
fn missing_value_uses_action_id() {
    let payload = payload_from_action("claim", None).expect("payload");
    assert_eq!(payload.action, "claim");
    assert!(payload.item_key.is_empty());
}

#[test]
fn submission_callback_splits_into_action_and_key() {
    let fields = BTreeMap::from([("close_reason".to_owned(), "shipped".to_owned())]);
    let payload = payload_from_submission("close:galtrader-d0a", fields).expect("payload");
    assert_eq!(payload.action, "close");
    assert_eq!(payload.item_key, "galtrader-d0a");
    assert_eq!(payload.field("close_reason"), Some("shipped"));
}

#[test]
fn malformed_callback_is_rejected() {
    assert!(payload_from_submission("close", BTreeMap::new()).is_none());
}

#[test]
fn direct_message_channels() {
    assert!(is_direct_message("D0123"));
    assert!(is_direct_message("G0123"));
    assert!(!is_direct_message("C0123"));
}

#[test]
fn dm_messages_are_answered_even_with_mentions() {
    assert!(answers_message_event("D0123", "ready"));
    assert!(answers_message_event("D0123", "<@U0BOT> ready"));
}

#[test]
fn group_messages_with_mentions_are_left_to_app_mention() {
    assert!(answers_message_event("G0123", "ready"));
    assert!(!answers_message_event("G0123", "<@U0BOT> ready"));
}

#[test]
fn channel_messages_are_never_answered() {
    assert!(!answers_message_event("C0123", "ready"));
    assert!(!answers_message_event("C0123", "<@U0BOT> ready"));
}

#[test]
fn reply_target_survives_metadata() {
    let target = ReplyTarget::new("C1", Some("1700000000.000100".to_owned()));
    let decoded = ReplyTarget::from_metadata(&target.to_metadata()).expect("decoded");
    assert_eq!(decoded, target);
}

#[test]
fn reply_target_rejects_garbage_metadata() {
    assert_eq!(ReplyTarget::from_metadata("??"), None);
}
