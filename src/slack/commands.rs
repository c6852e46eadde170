//! Slack slash command handler.
//!
//! The command text goes through the same pipeline as a chat message. The
//! reply is posted to the channel by a spawned task, so Slack gets its ack
//! without waiting on the REST API.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector, SlackCommandEvent,
    SlackCommandEventResponse, SlackMessageContent, SlackMessageResponseType,
};
use tracing::{info, warn};

use super::events::bridge_state;
use super::ReplyTarget;

fn ephemeral(text: impl Into<String>) -> SlackCommandEventResponse {
    SlackCommandEventResponse::new(SlackMessageContent::new().with_text(text.into()))
        .with_response_type(SlackMessageResponseType::Ephemeral)
}

/// Handle incoming slash commands routed via Socket Mode.
///
/// # Errors
///
/// Returns an error if the bridge state is missing from the listener.
pub async fn handle_command(
    event: SlackCommandEvent,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    states: SlackClientEventsUserState,
) -> slack_morphism::AnyStdResult<SlackCommandEventResponse> {
    let state = bridge_state(&states)
        .await
        .ok_or("bridge state not available")?;

    let user_id = event.user_id.to_string();
    if event.command.0 != state.config.slash_command {
        warn!(command = %event.command.0, "unexpected slash command");
        return Ok(ephemeral("Unknown command"));
    }
    if !state.is_authorized(&user_id) {
        return Ok(ephemeral("You are not authorized to use this command."));
    }

    let text = event.text.clone().unwrap_or_default();
    let target = ReplyTarget::new(event.channel_id.to_string(), None);
    let trigger_id = event.trigger_id.clone();
    info!(user_id, channel = %target.channel, text, "received slash command");

    tokio::spawn(async move {
        let doc = state.bot.handle_message(&text).await;
        state.deliver(&target, &doc, Some(&trigger_id)).await;
    });

    Ok(ephemeral(format!("{} {}", event.command.0, event.text.unwrap_or_default())))
}
