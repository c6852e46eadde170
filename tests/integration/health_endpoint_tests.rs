//! Integration tests for the HTTP health endpoint.
//!
//! Uses an ephemeral port to avoid conflicts with running instances.

use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use bead_intercom::health::{serve_health, SERVICE_NAME};

/// Spawn the health server on a free port, returning its base URL.
///
/// Caller must cancel `ct` to shut the server down.
async fn spawn_server() -> (String, CancellationToken, tokio::task::JoinHandle<()>) {
    // Discover a free port, then release it for `serve_health` to bind.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let handle = tokio::spawn(async move {
        serve_health(port, server_ct).await.expect("health server");
    });

    tokio::time::sleep(Duration::from_millis(200)).await;

    (format!("http://127.0.0.1:{port}"), ct, handle)
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (base_url, ct, handle) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/healthz"))
        .await
        .expect("HTTP GET /healthz");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], SERVICE_NAME);

    ct.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server stops after cancel")
        .expect("server task");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (base_url, ct, _handle) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("HTTP GET /health");

    assert_eq!(resp.status(), 404);
    ct.cancel();
}
