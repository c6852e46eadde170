//! Inbound events: free-text messages and structured interaction payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Payload action tag: claim an item.
pub const ACTION_CLAIM: &str = "claim";
/// Payload action tag: show the close-reason form.
pub const ACTION_CLOSE_PROMPT: &str = "close_prompt";
/// Payload action tag: close with the submitted reason.
pub const ACTION_CLOSE: &str = "close";
/// Form field carrying the close reason.
pub const CLOSE_REASON_FIELD: &str = "close_reason";

/// Structured data submitted from a previously rendered document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionPayload {
    /// Action tag identifying the handler.
    #[serde(default)]
    pub action: String,
    /// Item the action applies to.
    #[serde(default)]
    pub item_key: String,
    /// Any other submitted fields (form values).
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl InteractionPayload {
    /// Build a payload with no extra fields.
    pub fn new(action: impl Into<String>, item_key: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            item_key: item_key.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a submitted field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Decode a payload from a button value (JSON object of strings).
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the value is not a string map.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// A submitted field, ignoring blank values.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// One inbound chat event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Free text typed by a user.
    Text(String),
    /// A button press or form submission.
    Interaction(InteractionPayload),
}
