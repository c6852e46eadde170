//! Response-shape normalization.
//!
//! The REST API passes tracker CLI output through untouched, so the same
//! call may answer with a list, an object wrapping the list under `issues`
//! or `beads`, a one-element list for a single record, an empty object, or
//! an error object. These functions resolve the shape once, right after the
//! call, so nothing downstream has to guess.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use super::{BackendError, BackendResult};
use crate::models::item::{ItemRecord, ProjectRecord};

/// Status used when a successful response has an unusable shape.
pub const BAD_GATEWAY: u16 = 502;

/// Build a [`BackendError`] from an HTTP error status and response body.
///
/// Understands `{"error": true, "status", "detail"}` and `{"detail": ...}`
/// bodies; anything else is used as plain text.
#[must_use]
pub fn error_from_body(status: u16, body: &str) -> BackendError {
    let trimmed = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        if let Some(detail) = map.get("detail") {
            return BackendError::new(status, detail_text(detail));
        }
    }
    if trimmed.is_empty() {
        BackendError::new(status, format!("HTTP {status}"))
    } else {
        BackendError::new(status, trimmed)
    }
}

/// Normalize a list-items response.
///
/// # Errors
///
/// Returns the embedded error when the body is an error object.
pub fn items(value: Value) -> BackendResult<Vec<ItemRecord>> {
    match value {
        Value::Array(entries) => Ok(records(entries)),
        Value::Object(mut map) => {
            check_error_object(&map)?;
            let nested = map.remove("issues").or_else(|| map.remove("beads"));
            match nested {
                Some(Value::Array(entries)) => Ok(records(entries)),
                _ => Ok(Vec::new()),
            }
        }
        _ => Ok(Vec::new()),
    }
}

/// Normalize a single-item response.
///
/// # Errors
///
/// Returns the embedded error, `404 not found` for an empty list, or
/// `502` when the body is not a record.
pub fn item(value: Value) -> BackendResult<ItemRecord> {
    match value {
        Value::Array(entries) => match entries.into_iter().next() {
            Some(first) => item(first),
            None => Err(BackendError::new(404, "not found")),
        },
        Value::Object(map) => {
            check_error_object(&map)?;
            serde_json::from_value(Value::Object(map)).map_err(|err| {
                BackendError::new(BAD_GATEWAY, format!("malformed item record: {err}"))
            })
        }
        other => Err(BackendError::new(
            BAD_GATEWAY,
            format!("unexpected item response: {other}"),
        )),
    }
}

/// Normalize the response of a write (update / close).
///
/// Writes may answer with the record, a list holding it, `{}`, or a plain
/// `{"output": ...}` wrapper; all of those count as success.
///
/// # Errors
///
/// Returns the embedded error when the body is an error object.
pub fn acknowledgement(value: Value) -> BackendResult<ItemRecord> {
    match value {
        Value::Array(entries) => match entries.into_iter().next() {
            Some(first) => acknowledgement(first),
            None => Ok(ItemRecord::default()),
        },
        Value::Object(map) => {
            check_error_object(&map)?;
            Ok(serde_json::from_value(Value::Object(map)).unwrap_or_default())
        }
        _ => Ok(ItemRecord::default()),
    }
}

/// Normalize a list-projects response.
///
/// # Errors
///
/// Returns the embedded error when the body is an error object.
pub fn projects(value: Value) -> BackendResult<Vec<ProjectRecord>> {
    match value {
        Value::Array(entries) => Ok(records(entries)),
        Value::Object(map) => {
            check_error_object(&map)?;
            Ok(Vec::new())
        }
        _ => Ok(Vec::new()),
    }
}

fn check_error_object(map: &Map<String, Value>) -> BackendResult<()> {
    if map.get("error").and_then(Value::as_bool) != Some(true) {
        return Ok(());
    }
    let status = map
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(BAD_GATEWAY);
    let detail = map
        .get("detail")
        .map_or_else(|| "API error".to_owned(), detail_text);
    Err(BackendError::new(status, detail))
}

fn detail_text(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn records<T: DeserializeOwned>(entries: Vec<Value>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(%err, "skipping malformed record in list response");
                None
            }
        })
        .collect()
}
