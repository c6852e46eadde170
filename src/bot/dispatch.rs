//! Action dispatch: one backend call per intent, one document per call.
//!
//! Backend failures, whether reported by the API or caused by the
//! transport, all take the same error-card path.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::extract::project_for_key;
use crate::api::{Backend, BackendError, ItemFilter, ItemUpdate};
use crate::cards;
use crate::config::ProjectCatalog;
use crate::models::document::PresentationDocument;
use crate::models::intent::{Classification, Intent};
use crate::models::item::{ItemRecord, IN_PROGRESS_STATUS};

/// Limit for ready and list queries.
pub const LIST_LIMIT: u32 = 20;

/// Limit for the status summary query.
pub const STATUS_LIMIT: u32 = 50;

/// Executes intents against a [`Backend`] and renders the outcome.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    catalog: Arc<ProjectCatalog>,
    bot_name: String,
}

impl Dispatcher {
    /// Build a dispatcher.
    pub fn new(backend: Arc<dyn Backend>, catalog: Arc<ProjectCatalog>, bot_name: impl Into<String>) -> Self {
        Self {
            backend,
            catalog,
            bot_name: bot_name.into(),
        }
    }

    /// Render the document for a classified command.
    ///
    /// Item-scoped intents without a key render a usage error; a close
    /// without a reason renders the reason form instead of executing.
    pub async fn dispatch(&self, command: &Classification) -> PresentationDocument {
        let params = &command.params;
        let key = params.item_key.as_deref();

        if let (true, None, Some(usage)) =
            (command.intent.requires_item_key(), key, command.intent.usage())
        {
            info!(intent = ?command.intent, "item key missing; sending usage hint");
            return cards::usage_card(usage);
        }

        match (command.intent, key) {
            (Intent::Help, _) => cards::help_card(&self.bot_name),
            (Intent::ShowReady, _) => self.show_ready().await,
            (Intent::ShowItem, Some(key)) => self.show_item(key).await,
            (Intent::ListItems, _) => self.list_items(params.project.as_deref()).await,
            (Intent::ClaimItem, Some(key)) => self.claim(key).await,
            (Intent::CloseItem, Some(key)) => match params.reason.as_deref() {
                Some(reason) => self.close(key, reason).await,
                None => {
                    info!(item_key = key, "no close reason given; prompting");
                    cards::close_prompt_card(key)
                }
            },
            (Intent::ListProjects, _) => self.list_projects().await,
            (Intent::ShowStatus, _) => self.show_status(params.project.as_deref()).await,
            (Intent::Unknown | Intent::ShowItem | Intent::ClaimItem | Intent::CloseItem, _) => {
                cards::unknown_card(&self.bot_name)
            }
        }
    }

    /// Open items across projects.
    pub async fn show_ready(&self) -> PresentationDocument {
        let filter = ItemFilter::with_limit(LIST_LIMIT).status("open");
        match self.backend.list_items(&filter).await {
            Ok(items) => cards::ready_card(&items),
            Err(err) => failure("ready", None, &err, None),
        }
    }

    /// One item in detail.
    pub async fn show_item(&self, key: &str) -> PresentationDocument {
        let project = project_for_key(key, &self.catalog);
        info!(item_key = key, project = ?project, "fetching item");
        match self.backend.get_item(key, project.as_deref()).await {
            Ok(item) => cards::item_card(&item),
            Err(err) => failure("show", Some(key), &err, Some(format!("Item {key}"))),
        }
    }

    /// Items, optionally for one project.
    pub async fn list_items(&self, project: Option<&str>) -> PresentationDocument {
        let filter = ItemFilter::with_limit(LIST_LIMIT).project(project.map(str::to_owned));
        match self.backend.list_items(&filter).await {
            Ok(items) => {
                let title = match project {
                    Some(project) => format!("Open Items: {project}"),
                    None => "Open Items".to_owned(),
                };
                cards::item_list_card(&items, &title)
            }
            Err(err) => failure("list", None, &err, None),
        }
    }

    /// Set an item in progress and claim it.
    pub async fn claim(&self, key: &str) -> PresentationDocument {
        let project = project_for_key(key, &self.catalog);
        let update = ItemUpdate {
            status: Some(IN_PROGRESS_STATUS.to_owned()),
            claim: true,
            ..ItemUpdate::default()
        };
        match self.backend.update_item(key, project.as_deref(), &update).await {
            Ok(_) => {
                info!(item_key = key, "item claimed");
                cards::confirmation_card(&format!(
                    "Claimed *{key}*, status set to {IN_PROGRESS_STATUS}"
                ))
            }
            Err(err) => failure("claim", Some(key), &err, Some(format!("Failed to claim {key}"))),
        }
    }

    /// Close an item with a reason.
    pub async fn close(&self, key: &str, reason: &str) -> PresentationDocument {
        let project = project_for_key(key, &self.catalog);
        match self.backend.close_item(key, reason, project.as_deref()).await {
            Ok(_) => {
                info!(item_key = key, "item closed");
                cards::confirmation_card(&format!("Closed *{key}*: {reason}"))
            }
            Err(err) => failure("close", Some(key), &err, Some(format!("Failed to close {key}"))),
        }
    }

    /// Registered projects.
    pub async fn list_projects(&self) -> PresentationDocument {
        match self.backend.list_projects().await {
            Ok(projects) => cards::projects_card(&projects),
            Err(err) => failure("projects", None, &err, None),
        }
    }

    /// Item counts per status, aggregated locally from one list call.
    pub async fn show_status(&self, project: Option<&str>) -> PresentationDocument {
        let filter = ItemFilter::with_limit(STATUS_LIMIT).project(project.map(str::to_owned));
        match self.backend.list_items(&filter).await {
            Ok(items) => cards::status_card(&status_counts(&items), project),
            Err(err) => failure("status", None, &err, None),
        }
    }
}

/// Count items per status (missing status counts as `open`).
#[must_use]
pub fn status_counts(items: &[ItemRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.status().to_owned()).or_insert(0) += 1;
    }
    counts
}

fn failure(
    operation: &str,
    item_key: Option<&str>,
    err: &BackendError,
    context: Option<String>,
) -> PresentationDocument {
    warn!(
        operation,
        item_key,
        status = err.status,
        detail = %err.detail,
        "backend call failed"
    );
    match context {
        Some(context) => cards::error_card(&format!("{context}: {}", err.detail)),
        None => cards::error_card(&err.detail),
    }
}
