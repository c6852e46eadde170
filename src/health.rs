//! HTTP liveness endpoint.

use std::net::SocketAddr;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{AppError, Result};

/// Service name reported by `GET /healthz`.
pub const SERVICE_NAME: &str = "bead-intercom";

/// Handler for `GET /healthz`.
async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

/// Router exposing the health endpoint.
pub fn router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

/// Serve the health endpoint on `port` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the port cannot be bound, or
/// `AppError::Http` if the server fails while running.
pub async fn serve_health(port: u16, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(bind).await?;

    info!(%bind, "starting health endpoint");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Http(format!("health server error: {err}")))?;

    info!("health endpoint shut down");
    Ok(())
}
