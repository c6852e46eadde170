//! Item and project records as returned by the beads REST API.
//!
//! Every field is optional; renderers read them through accessors that
//! apply the display fallbacks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status values treated as terminal.
pub const CLOSED_STATUSES: &[&str] = &["closed", "done"];

/// Status written when an item is claimed.
pub const IN_PROGRESS_STATUS: &str = "in_progress";

/// One tracked item ("bead").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    /// Primary identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Alternate identifier field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Item title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Alternate title field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Workflow status (`open`, `in_progress`, `closed`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Priority; integer in practice but not guaranteed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
    /// Assigned user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Item type (`task`, `bug`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Item type as reported by the tracker CLI; read when `type` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ItemRecord {
    /// Key shown to users, `?` when the record has none.
    #[must_use]
    pub fn display_key(&self) -> &str {
        self.id
            .as_deref()
            .or(self.key.as_deref())
            .unwrap_or("?")
    }

    /// Title shown to users, `Untitled` when the record has none.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.summary.as_deref())
            .unwrap_or("Untitled")
    }

    /// Status, defaulting to `open`.
    #[must_use]
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("open")
    }

    /// Assignee, defaulting to `unassigned`.
    #[must_use]
    pub fn assignee(&self) -> &str {
        self.assignee
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or("unassigned")
    }

    /// Item type, defaulting to `task`.
    #[must_use]
    pub fn item_type(&self) -> &str {
        self.item_type
            .as_deref()
            .or(self.issue_type.as_deref())
            .unwrap_or("task")
    }

    /// Description, empty when absent.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Priority as text, `?` when absent.
    #[must_use]
    pub fn priority_label(&self) -> String {
        match &self.priority {
            None | Some(Value::Null) => "?".to_owned(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Priority as an integer when it is one.
    #[must_use]
    pub fn priority_level(&self) -> Option<i64> {
        match &self.priority {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether the item is closed or done.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        is_closed_status(self.status())
    }
}

/// Whether a status string is terminal.
#[must_use]
pub fn is_closed_status(status: &str) -> bool {
    CLOSED_STATUSES.contains(&status.to_lowercase().as_str())
}

/// One registered project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Project name.
    #[serde(default)]
    pub name: Option<String>,
    /// Item-key prefix used by the project.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Checkout path on the API host.
    #[serde(default)]
    pub path: Option<String>,
    /// Whether the project has a tracker directory.
    #[serde(default)]
    pub has_beads: bool,
}
