//! Integration tests for the HTTP backend against a fake REST API.
//!
//! The fake is an axum router on an ephemeral port that records every
//! request and answers with the response shapes the real API produces.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use bead_intercom::api::client::ApiClient;
use bead_intercom::api::{Backend, ItemFilter, ItemUpdate};
use bead_intercom::config::ApiConfig;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

fn json_response(status: StatusCode, body: &Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

async fn fake_api(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    log.lock().expect("log lock").push(Recorded {
        method: method.clone(),
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_str(&body).ok(),
    });

    match (method.as_str(), uri.path()) {
        ("GET", "/api/v1/beads") => json_response(
            StatusCode::OK,
            &json!({"issues": [{"id": "os-1", "status": "open"}, {"id": "os-2"}]}),
        ),
        ("GET", "/api/v1/beads/missing-1") => json_response(
            StatusCode::NOT_FOUND,
            &json!({"error": true, "status": 404, "detail": "not found"}),
        ),
        ("GET", "/api/v1/beads/garbled-1") => Response::builder()
            .status(StatusCode::OK)
            .body(Body::from("<html>oops</html>"))
            .expect("response"),
        ("GET", "/api/v1/beads/crash-1") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
        }
        ("GET", path) if path.starts_with("/api/v1/beads/") => {
            let id = path.trim_start_matches("/api/v1/beads/");
            json_response(StatusCode::OK, &json!([{"id": id, "title": "Found it"}]))
        }
        ("PATCH", _) => json_response(StatusCode::OK, &json!({})),
        ("POST", path) if path.ends_with("/close") => {
            json_response(StatusCode::OK, &json!({"output": "closed"}))
        }
        ("GET", "/api/v1/projects") => json_response(
            StatusCode::OK,
            &json!([{"name": "os", "prefix": "os", "has_beads": true}]),
        ),
        _ => (StatusCode::NOT_FOUND, "").into_response(),
    }
}

async fn spawn_fake() -> (String, Log) {
    let log = Log::default();
    let app = Router::new().fallback(fake_api).with_state(Arc::clone(&log));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), log)
}

fn client(base_url: &str, token: Option<&str>) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: base_url.to_owned(),
        timeout_seconds: 5,
        actor: "tester".to_owned(),
        token: token.map(str::to_owned),
    })
    .expect("client builds")
}

fn last(log: &Log) -> Recorded {
    log.lock()
        .expect("log lock")
        .last()
        .cloned()
        .expect("a recorded request")
}

#[tokio::test]
async fn list_sends_filters_and_unwraps_issues() {
    let (base, log) = spawn_fake().await;
    let api = client(&base, Some("secret"));

    let filter = ItemFilter::with_limit(20)
        .project(Some("os".into()))
        .status("open");
    let items = api.list_items(&filter).await.expect("items");

    assert_eq!(items.len(), 2);
    let request = last(&log);
    assert_eq!(request.path, "/api/v1/beads");
    let query = request.query.expect("query string");
    assert!(query.contains("limit=20"), "{query}");
    assert!(query.contains("project=os"), "{query}");
    assert!(query.contains("status=open"), "{query}");
    assert_eq!(request.authorization.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn no_token_means_no_auth_header() {
    let (base, log) = spawn_fake().await;
    let api = client(&base, None);

    api.list_projects().await.expect("projects");

    assert_eq!(last(&log).authorization, None);
}

#[tokio::test]
async fn get_passes_project_and_unwraps_single_element_list() {
    let (base, log) = spawn_fake().await;
    let api = client(&base, None);

    let item = api.get_item("os-mjb", Some("os")).await.expect("item");

    assert_eq!(item.display_key(), "os-mjb");
    assert_eq!(item.display_title(), "Found it");
    let request = last(&log);
    assert_eq!(request.path, "/api/v1/beads/os-mjb");
    assert_eq!(request.query.as_deref(), Some("project=os"));
}

#[tokio::test]
async fn error_object_becomes_backend_error() {
    let (base, _log) = spawn_fake().await;
    let api = client(&base, None);

    let err = api.get_item("missing-1", None).await.unwrap_err();

    assert_eq!(err.status, 404);
    assert_eq!(err.detail, "not found");
}

#[tokio::test]
async fn plain_text_error_body_is_the_detail() {
    let (base, _log) = spawn_fake().await;
    let api = client(&base, None);

    let err = api.get_item("crash-1", None).await.unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(err.detail, "boom");
}

#[tokio::test]
async fn non_json_success_is_bad_gateway() {
    let (base, _log) = spawn_fake().await;
    let api = client(&base, None);

    let err = api.get_item("garbled-1", None).await.unwrap_err();

    assert_eq!(err.status, 502);
}

#[tokio::test]
async fn update_sends_patch_with_project_and_actor() {
    let (base, log) = spawn_fake().await;
    let api = client(&base, None);

    let update = ItemUpdate {
        status: Some("in_progress".into()),
        claim: true,
        ..ItemUpdate::default()
    };
    api.update_item("os-1", Some("os"), &update)
        .await
        .expect("update acknowledged");

    let request = last(&log);
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/api/v1/beads/os-1");
    assert_eq!(
        request.body,
        Some(json!({
            "status": "in_progress",
            "claim": true,
            "project": "os",
            "actor": "tester"
        }))
    );
}

#[tokio::test]
async fn close_posts_reason() {
    let (base, log) = spawn_fake().await;
    let api = client(&base, None);

    api.close_item("vms-3", "obsolete", None)
        .await
        .expect("close acknowledged");

    let request = last(&log);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/v1/beads/vms-3/close");
    assert_eq!(
        request.body,
        Some(json!({"reason": "obsolete", "actor": "tester"}))
    );
}

#[tokio::test]
async fn projects_are_decoded() {
    let (base, _log) = spawn_fake().await;
    let api = client(&base, None);

    let projects = api.list_projects().await.expect("projects");

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name.as_deref(), Some("os"));
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let (base, log) = spawn_fake().await;
    let api = client(&format!("{base}/"), None);

    api.list_projects().await.expect("projects");

    assert_eq!(last(&log).path, "/api/v1/projects");
}

#[tokio::test]
async fn unreachable_api_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let api = client(&format!("http://{addr}"), None);
    let err = api.list_projects().await.unwrap_err();

    assert_eq!(err.status, 0);
    assert!(!err.detail.is_empty());
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = ApiClient::new(&ApiConfig {
        base_url: "not a url".into(),
        ..ApiConfig::default()
    });
    assert!(result.is_err());
}
