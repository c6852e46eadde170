//! Slack Socket Mode client with a small buffered send queue.

use std::sync::Arc;
use std::time::Duration;

use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiToken, SlackApiTokenType, SlackApiTokenValue,
    SlackApiViewsOpenRequest, SlackBlock, SlackChannelId, SlackClient,
    SlackClientEventsListenerEnvironment, SlackClientHyperHttpsConnector, SlackClientSession,
    SlackClientSocketModeConfig, SlackClientSocketModeListener, SlackMessageContent,
    SlackSocketModeListenerCallbacks, SlackTriggerId, SlackTs, SlackView,
};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::{blocks, commands, events, BridgeState};
use crate::models::document::PresentationDocument;
use crate::{config::SlackConfig, AppError, Result};

const QUEUE_CAPACITY: usize = 256;
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
const MAX_SEND_ATTEMPTS: u32 = 5;

/// Message to be delivered to Slack via chat.postMessage.
#[derive(Debug, Clone)]
pub struct SlackMessage {
    /// Destination channel.
    pub channel: SlackChannelId,
    /// Notification fallback text.
    pub text: Option<String>,
    /// Block Kit body.
    pub blocks: Option<Vec<SlackBlock>>,
    /// Parent message when replying in a thread.
    pub thread_ts: Option<SlackTs>,
}

impl SlackMessage {
    /// Render a document as a message.
    #[must_use]
    pub fn document(
        channel: SlackChannelId,
        doc: &PresentationDocument,
        thread_ts: Option<SlackTs>,
    ) -> Self {
        Self {
            channel,
            text: Some(doc.summary_text().to_owned()),
            blocks: Some(blocks::render_document(doc)),
            thread_ts,
        }
    }

    fn into_request(self) -> SlackApiChatPostMessageRequest {
        let mut content = SlackMessageContent::new();
        content.text = self.text;
        content.blocks = self.blocks;

        let mut request = SlackApiChatPostMessageRequest::new(self.channel, content);
        request.thread_ts = self.thread_ts;
        request
    }
}

/// Slack client that owns a rate-limited outgoing queue.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
    app_token: SlackApiToken,
    queue_tx: mpsc::Sender<SlackMessage>,
}

fn token(value: &str, token_type: SlackApiTokenType) -> SlackApiToken {
    SlackApiToken {
        token_value: SlackApiTokenValue(value.to_owned()),
        cookie: None,
        team_id: None,
        scope: None,
        token_type: Some(token_type),
    }
}

impl SlackService {
    /// Start the Slack client and background sender task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn start(config: &SlackConfig) -> Result<(Self, JoinHandle<()>)> {
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let client = Arc::new(SlackClient::new(connector));
        let bot_token = token(&config.bot_token, SlackApiTokenType::Bot);
        let app_token = token(&config.app_token, SlackApiTokenType::App);

        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);
        let queue_task = Self::spawn_worker(Arc::clone(&client), bot_token.clone(), queue_rx);

        info!("slack sender queue started");

        Ok((
            Self {
                client,
                bot_token,
                app_token,
                queue_tx,
            },
            queue_task,
        ))
    }

    /// Enqueue a message for async delivery.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the sender task has stopped.
    pub async fn enqueue(&self, message: SlackMessage) -> Result<()> {
        self.queue_tx
            .send(message)
            .await
            .map_err(|err| AppError::Slack(format!("failed to enqueue slack message: {err}")))
    }

    fn spawn_worker(
        client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
        token: SlackApiToken,
        mut queue_rx: mpsc::Receiver<SlackMessage>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let session = client.open_session(&token);
            while let Some(message) = queue_rx.recv().await {
                let channel = message.channel.to_string();
                let request = message.into_request();
                let mut backoff = INITIAL_RETRY_DELAY;
                for attempt in 1..=MAX_SEND_ATTEMPTS {
                    match session.chat_post_message(&request).await {
                        Ok(_) => {
                            info!(channel, "sent slack message");
                            break;
                        }
                        Err(error) if attempt == MAX_SEND_ATTEMPTS => {
                            error!(?error, channel, attempt, "slack post failed; dropping message");
                        }
                        Err(error) => {
                            let delay = match &error {
                                slack_morphism::errors::SlackClientError::RateLimitError(rate) => {
                                    rate.retry_after.unwrap_or(backoff)
                                }
                                _ => backoff,
                            };
                            warn!(?error, delay = ?delay, attempt, "slack post failed; retrying");
                            sleep(delay).await;
                            backoff = (backoff * 2).min(MAX_RETRY_DELAY);
                        }
                    }
                }
            }
            info!("slack sender task exiting");
        })
    }

    /// Listen for Socket Mode events until `ct` is cancelled.
    #[must_use]
    pub fn spawn_socket_mode(
        &self,
        state: Arc<BridgeState>,
        ct: CancellationToken,
    ) -> JoinHandle<()> {
        let listener_env = Arc::new(
            SlackClientEventsListenerEnvironment::new(Arc::clone(&self.client))
                .with_error_handler(|err, _client, _state| {
                    error!(?err, "socket mode error");
                    axum::http::StatusCode::OK
                })
                .with_user_state(state),
        );
        let callbacks = SlackSocketModeListenerCallbacks::new()
            .with_hello_events(|event, _client, _state| async move {
                info!(?event, "socket hello");
            })
            .with_command_events(commands::handle_command)
            .with_interaction_events(events::handle_interaction)
            .with_push_events(events::handle_push_event);

        let config = SlackClientSocketModeConfig {
            max_connections_count: SlackClientSocketModeConfig::DEFAULT_CONNECTIONS_COUNT,
            debug_connections: SlackClientSocketModeConfig::DEFAULT_DEBUG_CONNECTIONS,
            initial_backoff_in_seconds:
                SlackClientSocketModeConfig::DEFAULT_INITIAL_BACKOFF_IN_SECONDS,
            reconnect_timeout_in_seconds:
                SlackClientSocketModeConfig::DEFAULT_RECONNECT_TIMEOUT_IN_SECONDS,
            ping_interval_in_seconds: SlackClientSocketModeConfig::DEFAULT_PING_INTERVAL_IN_SECONDS,
            ping_failure_threshold_times:
                SlackClientSocketModeConfig::DEFAULT_PING_FAILURE_THRESHOLD_TIMES,
        };
        let listener = SlackClientSocketModeListener::new(&config, listener_env, callbacks);
        let app_token = self.app_token.clone();
        tokio::spawn(async move {
            if let Err(error) = listener.listen_for(&app_token).await {
                error!(?error, "socket mode listen failed");
                return;
            }

            info!("socket mode listener connected");
            tokio::select! {
                _ = listener.serve() => info!("socket mode listener exited"),
                () = ct.cancelled() => {
                    listener.shutdown().await;
                    info!("socket mode listener shut down");
                }
            }
        })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    /// Open a Slack modal dialog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the API call fails.
    pub async fn open_modal(&self, trigger_id: SlackTriggerId, view: SlackView) -> Result<()> {
        let request = SlackApiViewsOpenRequest::new(trigger_id, view);
        self.http_session()
            .views_open(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to open modal: {err}")))?;
        Ok(())
    }
}
