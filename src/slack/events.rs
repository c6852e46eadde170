//! Socket Mode push events (messages, mentions) and interactions
//! (button presses, modal submissions).
//!
//! Every event is checked against `authorized_user_ids` before it reaches
//! the bot. Unauthorized users get no reply; the attempt is only logged.
//! Bot work runs on a spawned task so the Socket Mode ack is not delayed
//! by REST API latency.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use slack_morphism::prelude::{
    SlackActionId, SlackBlockId, SlackClient, SlackClientEventsUserState,
    SlackClientHyperHttpsConnector, SlackEventCallbackBody, SlackInteractionBlockActionsEvent,
    SlackInteractionEvent, SlackInteractionViewSubmissionEvent, SlackPushEventCallback,
    SlackView,
};
use tracing::{debug, info, warn};

use super::{BridgeState, ReplyTarget};
use crate::models::interaction::InteractionPayload;

/// Fetch the bridge state registered with the listener environment.
pub(crate) async fn bridge_state(states: &SlackClientEventsUserState) -> Option<Arc<BridgeState>> {
    let guard = states.read().await;
    guard.get_user_state::<Arc<BridgeState>>().cloned()
}

/// Whether a channel id denotes a direct or group-direct conversation.
#[must_use]
pub fn is_direct_message(channel_id: &str) -> bool {
    channel_id.starts_with('D') || channel_id.starts_with('G')
}

/// Whether a plain `message` event should be answered.
///
/// One-to-one DMs always are. In group conversations a message carrying a
/// mention also arrives as `app_mention`, which answers it instead.
#[must_use]
pub fn answers_message_event(channel_id: &str, text: &str) -> bool {
    if channel_id.starts_with('D') {
        return true;
    }
    is_direct_message(channel_id) && !text.contains("<@")
}

/// Decode a button press into a payload.
///
/// The button value carries the JSON payload; the `action_id` fills in the
/// action tag when the value omits it.
#[must_use]
pub fn payload_from_action(action_id: &str, value: Option<&str>) -> Option<InteractionPayload> {
    let mut payload = match value.map(InteractionPayload::from_json) {
        Some(Ok(payload)) => payload,
        Some(Err(err)) => {
            warn!(%err, action_id, "undecodable button value");
            return None;
        }
        None => InteractionPayload::default(),
    };
    if payload.action.is_empty() {
        payload.action = action_id.to_owned();
    }
    Some(payload)
}

/// Decode a modal submission whose `callback_id` is `{action}:{item_key}`.
#[must_use]
pub fn payload_from_submission(
    callback_id: &str,
    fields: BTreeMap<String, String>,
) -> Option<InteractionPayload> {
    let (action, item_key) = callback_id.split_once(':')?;
    let mut payload = InteractionPayload::new(action, item_key);
    payload.fields = fields;
    Some(payload)
}

/// Flatten submitted form state to `action_id -> value`.
fn submitted_fields<V>(
    values: &HashMap<SlackBlockId, HashMap<SlackActionId, V>>,
    value_of: impl Fn(&V) -> Option<&String>,
) -> BTreeMap<String, String> {
    values
        .values()
        .flat_map(HashMap::iter)
        .filter_map(|(action_id, state)| {
            value_of(state).map(|value| (action_id.to_string(), value.clone()))
        })
        .collect()
}

/// Handle messages and mentions delivered via Socket Mode.
///
/// Channel messages are answered only through `app_mention`; plain
/// `message` events are answered in direct conversations.
///
/// # Errors
///
/// Never fails; problems are logged.
pub async fn handle_push_event(
    event: SlackPushEventCallback,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    states: SlackClientEventsUserState,
) -> slack_morphism::UserCallbackResult<()> {
    let Some(state) = bridge_state(&states).await else {
        warn!("bridge state not available; dropping push event");
        return Ok(());
    };

    let (user_id, text, target) = match event.event {
        SlackEventCallbackBody::AppMention(mention) => (
            mention.user.to_string(),
            mention.content.text.unwrap_or_default(),
            ReplyTarget::new(
                mention.channel.to_string(),
                mention.origin.thread_ts.map(|ts| ts.to_string()),
            ),
        ),
        SlackEventCallbackBody::Message(message) => {
            if message.sender.bot_id.is_some() || message.subtype.is_some() {
                return Ok(());
            }
            let Some(channel) = message.origin.channel.map(|c| c.to_string()) else {
                return Ok(());
            };
            let (Some(user), Some(text)) = (
                message.sender.user.map(|u| u.to_string()),
                message.content.and_then(|content| content.text),
            ) else {
                return Ok(());
            };
            if !answers_message_event(&channel, &text) {
                return Ok(());
            }
            let thread_ts = message.origin.thread_ts.map(|ts| ts.to_string());
            (user, text, ReplyTarget::new(channel, thread_ts))
        }
        other => {
            debug!(?other, "push event ignored");
            return Ok(());
        }
    };

    if !state.is_authorized(&user_id) {
        return Ok(());
    }

    info!(user_id, channel = %target.channel, "message received");
    tokio::spawn(async move {
        let doc = state.bot.handle_message(&text).await;
        state.deliver(&target, &doc, None).await;
    });
    Ok(())
}

/// Handle interactive payloads (buttons, modals) delivered via Socket Mode.
///
/// # Errors
///
/// Never fails; problems are logged.
pub async fn handle_interaction(
    event: SlackInteractionEvent,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    states: SlackClientEventsUserState,
) -> slack_morphism::UserCallbackResult<()> {
    let Some(state) = bridge_state(&states).await else {
        warn!("bridge state not available; cannot process interaction");
        return Ok(());
    };

    match event {
        SlackInteractionEvent::BlockActions(block_event) => {
            handle_block_actions(block_event, state);
        }
        SlackInteractionEvent::ViewSubmission(view_event) => {
            handle_view_submission(&view_event, state);
        }
        other => {
            debug!(?other, "unhandled interaction event type");
        }
    }
    Ok(())
}

fn handle_block_actions(event: SlackInteractionBlockActionsEvent, state: Arc<BridgeState>) {
    let user_id = event
        .user
        .as_ref()
        .map(|u| u.id.to_string())
        .unwrap_or_default();
    if user_id.is_empty() {
        warn!("block action with empty user ID; ignoring");
        return;
    }
    if !state.is_authorized(&user_id) {
        return;
    }

    let Some(channel) = event.channel.as_ref().map(|c| c.id.to_string()) else {
        warn!(user_id, "block action outside a channel; ignoring");
        return;
    };
    let thread_ts = event
        .message
        .as_ref()
        .and_then(|m| m.origin.thread_ts.as_ref())
        .map(ToString::to_string);
    let target = ReplyTarget::new(channel, thread_ts);

    let form_fields = event
        .state
        .as_ref()
        .map(|s| submitted_fields(&s.values, |v| v.value.as_ref()))
        .unwrap_or_default();

    for action in event.actions.unwrap_or_default() {
        let action_id = action.action_id.to_string();
        let Some(mut payload) = payload_from_action(&action_id, action.value.as_deref()) else {
            continue;
        };
        for (name, value) in &form_fields {
            payload.fields.entry(name.clone()).or_insert_with(|| value.clone());
        }

        info!(action_id, user_id, item_key = %payload.item_key, "dispatching block action");
        let state = Arc::clone(&state);
        let target = target.clone();
        let trigger_id = event.trigger_id.clone();
        tokio::spawn(async move {
            if let Some(doc) = state.bot.handle_interaction(&payload).await {
                state.deliver(&target, &doc, Some(&trigger_id)).await;
            }
        });
    }
}

fn handle_view_submission(event: &SlackInteractionViewSubmissionEvent, state: Arc<BridgeState>) {
    let user_id = event.user.id.to_string();
    if !state.is_authorized(&user_id) {
        return;
    }

    let SlackView::Modal(modal) = &event.view.view else {
        warn!(user_id, "unexpected home view in submission");
        return;
    };
    let callback_id = modal
        .callback_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    let Some(target) = modal
        .private_metadata
        .as_deref()
        .and_then(ReplyTarget::from_metadata)
    else {
        warn!(callback_id, "modal submission without a reply target");
        return;
    };

    let fields = event
        .view
        .state_params
        .state
        .as_ref()
        .map(|s| submitted_fields(&s.values, |v| v.value.as_ref()))
        .unwrap_or_default();
    let Some(payload) = payload_from_submission(&callback_id, fields) else {
        warn!(callback_id, "malformed modal callback_id");
        return;
    };

    info!(callback_id, user_id, "dispatching modal submission");
    tokio::spawn(async move {
        if let Some(doc) = state.bot.handle_interaction(&payload).await {
            state.deliver(&target, &doc, None).await;
        }
    });
}
