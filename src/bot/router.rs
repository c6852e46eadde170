//! Routing of button presses and form submissions by action tag.

use tracing::{debug, info};

use super::dispatch::Dispatcher;
use crate::cards;
use crate::models::document::PresentationDocument;
use crate::models::interaction::{
    InteractionPayload, ACTION_CLAIM, ACTION_CLOSE, ACTION_CLOSE_PROMPT, CLOSE_REASON_FIELD,
};

/// Maps interaction payloads to dispatcher calls.
#[derive(Clone)]
pub struct InteractionRouter {
    dispatcher: Dispatcher,
    default_close_reason: String,
}

impl InteractionRouter {
    /// Build a router over a dispatcher.
    pub fn new(dispatcher: Dispatcher, default_close_reason: impl Into<String>) -> Self {
        Self {
            dispatcher,
            default_close_reason: default_close_reason.into(),
        }
    }

    /// Handle one payload.
    ///
    /// Returns `None` for an unrecognized action tag; nothing is sent back
    /// in that case.
    pub async fn route(&self, payload: &InteractionPayload) -> Option<PresentationDocument> {
        let key = payload.item_key.as_str();

        let doc = match payload.action.as_str() {
            ACTION_CLAIM => self.dispatcher.claim(key).await,
            ACTION_CLOSE_PROMPT => cards::close_prompt_card(key),
            ACTION_CLOSE => {
                let reason = payload
                    .field(CLOSE_REASON_FIELD)
                    .unwrap_or(&self.default_close_reason);
                self.dispatcher.close(key, reason).await
            }
            other => {
                debug!(action = other, item_key = key, "ignoring unrecognized action");
                return None;
            }
        };

        info!(action = %payload.action, item_key = key, "interaction handled");
        Some(doc)
    }
}
