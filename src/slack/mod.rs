//! Slack bridge: Socket Mode events in, Block Kit messages out.

pub mod blocks;
pub mod client;
pub mod commands;
pub mod events;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slack_morphism::prelude::{SlackChannelId, SlackTriggerId, SlackTs};
use tracing::{info, warn};

use crate::bot::Bot;
use crate::config::GlobalConfig;
use crate::models::document::PresentationDocument;

use self::client::{SlackMessage, SlackService};

/// Where a reply goes: a channel, optionally inside a thread.
///
/// Serialized into a modal's `private_metadata` so the submission can be
/// answered in the conversation that opened the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Channel (or DM) id.
    pub channel: String,
    /// Parent message timestamp when replying in a thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl ReplyTarget {
    /// Reply target for a channel and optional thread.
    pub fn new(channel: impl Into<String>, thread_ts: Option<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts,
        }
    }

    /// Encode for a modal's `private_metadata`.
    #[must_use]
    pub fn to_metadata(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode from a modal's `private_metadata`.
    #[must_use]
    pub fn from_metadata(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// State shared with the Socket Mode callbacks.
pub struct BridgeState {
    /// Command pipeline.
    pub bot: Bot,
    /// Loaded configuration.
    pub config: Arc<GlobalConfig>,
    /// Outbound Slack client.
    pub slack: Arc<SlackService>,
}

impl BridgeState {
    /// Whether `user_id` may use the bot. Denials are logged, never answered.
    pub fn is_authorized(&self, user_id: &str) -> bool {
        if self.config.is_authorized(user_id) {
            return true;
        }
        warn!(user_id, "unauthorized slack user ignored");
        false
    }

    /// Send a document to the user.
    ///
    /// Forms open as a modal when Slack supplied a `trigger_id`; everything
    /// else is posted as a message.
    pub async fn deliver(
        &self,
        target: &ReplyTarget,
        doc: &PresentationDocument,
        trigger_id: Option<&SlackTriggerId>,
    ) {
        if let Some(trigger_id) = trigger_id {
            if let Some(view) = blocks::form_modal(doc, &target.to_metadata()) {
                match self.slack.open_modal(trigger_id.clone(), view).await {
                    Ok(()) => {
                        info!(channel = %target.channel, "form opened as modal");
                        return;
                    }
                    Err(err) => warn!(%err, "modal open failed; posting form inline"),
                }
            }
        }

        let message = SlackMessage::document(
            SlackChannelId(target.channel.clone()),
            doc,
            target.thread_ts.clone().map(SlackTs),
        );
        if let Err(err) = self.slack.enqueue(message).await {
            warn!(%err, channel = %target.channel, "failed to queue reply");
        }
    }
}
