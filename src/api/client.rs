//! HTTP implementation of [`Backend`] over `reqwest`.

use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::normalize::{self, BAD_GATEWAY};
use super::{Backend, BackendError, BackendFuture, BackendResult, ItemFilter, ItemUpdate};
use crate::config::ApiConfig;
use crate::models::item::{ItemRecord, ProjectRecord};
use crate::{AppError, Result};

/// Client for the beads REST API (`/api/v1`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    actor: String,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    #[serde(flatten)]
    update: &'a ItemUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    actor: &'a str,
}

#[derive(Serialize)]
struct CloseBody<'a> {
    reason: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    actor: &'a str,
}

impl ApiClient {
    /// Build a client from API settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparseable base URL and
    /// `AppError::Api` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|err| AppError::Config(format!("invalid api.base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "api.base_url cannot be used as a base: {base_url}"
            )));
        }
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            actor: config.actor.clone(),
        })
    }

    /// Absolute URL for `/api/v1/{segments...}`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode the JSON body, mapping every failure to a
    /// [`BackendError`].
    async fn execute(&self, request: RequestBuilder) -> BackendResult<Value> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| BackendError::transport(format!("request failed: {err}")))?;

        let status = response.status().as_u16();
        let url = response.url().path().to_owned();
        let body = response
            .text()
            .await
            .map_err(|err| BackendError::transport(format!("failed to read response: {err}")))?;

        if status >= 400 {
            let err = normalize::error_from_body(status, &body);
            warn!(status, path = %url, detail = %err.detail, "api returned error status");
            return Err(err);
        }

        debug!(status, path = %url, bytes = body.len(), "api response received");

        if body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&body)
            .map_err(|err| BackendError::new(BAD_GATEWAY, format!("invalid JSON from API: {err}")))
    }
}

impl Backend for ApiClient {
    fn list_items<'a>(&'a self, filter: &'a ItemFilter) -> BackendFuture<'a, Vec<ItemRecord>> {
        Box::pin(async move {
            let mut url = self.endpoint(&["beads"]);
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("limit", &filter.limit.to_string());
                if let Some(project) = &filter.project {
                    query.append_pair("project", project);
                }
                if let Some(status) = &filter.status {
                    query.append_pair("status", status);
                }
                if let Some(priority) = filter.priority {
                    query.append_pair("priority", &priority.to_string());
                }
            }
            let value = self.execute(self.http.get(url)).await?;
            normalize::items(value)
        })
    }

    fn get_item<'a>(
        &'a self,
        key: &'a str,
        project: Option<&'a str>,
    ) -> BackendFuture<'a, ItemRecord> {
        Box::pin(async move {
            let mut url = self.endpoint(&["beads", key]);
            if let Some(project) = project {
                url.query_pairs_mut().append_pair("project", project);
            }
            let value = self.execute(self.http.get(url)).await?;
            normalize::item(value)
        })
    }

    fn update_item<'a>(
        &'a self,
        key: &'a str,
        project: Option<&'a str>,
        update: &'a ItemUpdate,
    ) -> BackendFuture<'a, ItemRecord> {
        Box::pin(async move {
            let body = UpdateBody {
                update,
                project,
                actor: &self.actor,
            };
            let request = self.http.patch(self.endpoint(&["beads", key])).json(&body);
            let value = self.execute(request).await?;
            normalize::acknowledgement(value)
        })
    }

    fn close_item<'a>(
        &'a self,
        key: &'a str,
        reason: &'a str,
        project: Option<&'a str>,
    ) -> BackendFuture<'a, ItemRecord> {
        Box::pin(async move {
            let body = CloseBody {
                reason,
                project,
                actor: &self.actor,
            };
            let request = self
                .http
                .post(self.endpoint(&["beads", key, "close"]))
                .json(&body);
            let value = self.execute(request).await?;
            normalize::acknowledgement(value)
        })
    }

    fn list_projects(&self) -> BackendFuture<'_, Vec<ProjectRecord>> {
        Box::pin(async move {
            let value = self.execute(self.http.get(self.endpoint(&["projects"]))).await?;
            normalize::projects(value)
        })
    }
}
