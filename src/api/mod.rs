//! Beads REST API access.
//!
//! The [`Backend`] trait is the seam between the command pipeline and the
//! REST API. [`client::ApiClient`] implements it over HTTP; tests substitute
//! in-memory fakes. Every call resolves to a [`BackendResult`]: the pipeline
//! never sees raw JSON shapes or transport errors.

pub mod client;
pub mod normalize;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::models::item::{ItemRecord, ProjectRecord};

/// Failure of a backend call, whether reported by the API or by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// HTTP status; `0` when no HTTP response was received.
    pub status: u16,
    /// Human-readable detail, passed to users verbatim.
    pub detail: String,
}

impl BackendError {
    /// Build an error.
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Error for a request that never produced an HTTP response.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(0, detail)
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.detail, self.status)
    }
}

impl std::error::Error for BackendError {}

/// Outcome of one backend call.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Boxed future returned by [`Backend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'a>>;

/// Filters for listing items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Restrict to one project; `None` lets the API pick its default.
    pub project: Option<String>,
    /// Restrict to one status.
    pub status: Option<String>,
    /// Restrict to one priority.
    pub priority: Option<i64>,
    /// Maximum number of records.
    pub limit: u32,
}

impl ItemFilter {
    /// Filter with only a limit.
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Restrict to a project.
    #[must_use]
    pub fn project(mut self, project: Option<String>) -> Self {
        self.project = project;
        self
    }

    /// Restrict to a status.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Fields changed by an item update. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ItemUpdate {
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// New assignee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Claim the item for the acting user.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub claim: bool,
}

/// Request/response contract of the beads REST API.
pub trait Backend: Send + Sync {
    /// List items matching a filter.
    fn list_items<'a>(&'a self, filter: &'a ItemFilter) -> BackendFuture<'a, Vec<ItemRecord>>;

    /// Fetch one item; `project` is a hint for the API.
    fn get_item<'a>(&'a self, key: &'a str, project: Option<&'a str>)
        -> BackendFuture<'a, ItemRecord>;

    /// Apply an update to one item.
    fn update_item<'a>(
        &'a self,
        key: &'a str,
        project: Option<&'a str>,
        update: &'a ItemUpdate,
    ) -> BackendFuture<'a, ItemRecord>;

    /// Close one item with a reason.
    fn close_item<'a>(
        &'a self,
        key: &'a str,
        reason: &'a str,
        project: Option<&'a str>,
    ) -> BackendFuture<'a, ItemRecord>;

    /// List registered projects.
    fn list_projects(&self) -> BackendFuture<'_, Vec<ProjectRecord>>;
}
