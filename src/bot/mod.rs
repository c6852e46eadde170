//! The command pipeline: extraction, classification, dispatch, routing.
//!
//! [`Bot`] is transport-agnostic. A chat adapter hands it raw message text
//! or a decoded [`InteractionPayload`] and receives at most one
//! [`PresentationDocument`] to draw.

pub mod classify;
pub mod dispatch;
pub mod extract;
pub mod router;

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::api::Backend;
use crate::config::{GlobalConfig, ProjectCatalog};
use crate::models::document::PresentationDocument;
use crate::models::interaction::{InboundMessage, InteractionPayload};

use self::dispatch::Dispatcher;
use self::router::InteractionRouter;

/// Chat command handler bound to one backend.
#[derive(Clone)]
pub struct Bot {
    catalog: Arc<ProjectCatalog>,
    dispatcher: Dispatcher,
    router: InteractionRouter,
}

impl Bot {
    /// Build a bot from configuration and a backend.
    pub fn new(config: &GlobalConfig, backend: Arc<dyn Backend>) -> Self {
        let catalog = Arc::new(config.projects.clone());
        let dispatcher = Dispatcher::new(backend, Arc::clone(&catalog), config.bot_name.clone());
        let router = InteractionRouter::new(dispatcher.clone(), config.default_close_reason.clone());
        Self {
            catalog,
            dispatcher,
            router,
        }
    }

    /// Reply to a free-text message. Always produces exactly one document.
    pub async fn handle_message(&self, raw: &str) -> PresentationDocument {
        let span = info_span!("message", event_id = %Uuid::new_v4());
        async {
            let command = classify::interpret(raw, &self.catalog);
            info!(
                intent = ?command.intent,
                item_key = ?command.params.item_key,
                project = ?command.params.project,
                "message classified"
            );
            self.dispatcher.dispatch(&command).await
        }
        .instrument(span)
        .await
    }

    /// Reply to a button press or form submission, if the action is known.
    pub async fn handle_interaction(
        &self,
        payload: &InteractionPayload,
    ) -> Option<PresentationDocument> {
        let span = info_span!(
            "interaction",
            event_id = %Uuid::new_v4(),
            action = %payload.action
        );
        self.router.route(payload).instrument(span).await
    }

    /// Reply to any inbound event.
    pub async fn handle(&self, message: &InboundMessage) -> Option<PresentationDocument> {
        match message {
            InboundMessage::Text(text) => Some(self.handle_message(text).await),
            InboundMessage::Interaction(payload) => self.handle_interaction(payload).await,
        }
    }
}
