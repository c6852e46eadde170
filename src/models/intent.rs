//! Classified chat commands and the parameters extracted alongside them.

use serde::{Deserialize, Serialize};

/// Purpose of an inbound chat command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Show the command reference.
    Help,
    /// List open items across projects.
    ShowReady,
    /// Show one item in detail.
    ShowItem,
    /// List items, optionally for one project.
    ListItems,
    /// Set an item in progress and claim it.
    ClaimItem,
    /// Close an item with a reason.
    CloseItem,
    /// List registered projects.
    ListProjects,
    /// Summarize item counts per status.
    ShowStatus,
    /// Nothing matched.
    Unknown,
}

impl Intent {
    /// Whether the intent needs an item key to execute.
    #[must_use]
    pub fn requires_item_key(self) -> bool {
        matches!(self, Self::ShowItem | Self::ClaimItem | Self::CloseItem)
    }

    /// Usage hint shown when a required item key is missing.
    #[must_use]
    pub fn usage(self) -> Option<&'static str> {
        match self {
            Self::ShowItem => Some("show <item-key>"),
            Self::ClaimItem => Some("claim <item-key>"),
            Self::CloseItem => Some("done <item-key> [reason]"),
            _ => None,
        }
    }
}

/// Parameters pulled out of the command text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedParameters {
    /// Item key such as `os-mjb`.
    pub item_key: Option<String>,
    /// Project named in the text.
    pub project: Option<String>,
    /// Free-text close reason.
    pub reason: Option<String>,
}

/// Result of interpreting one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Matched intent.
    pub intent: Intent,
    /// Parameters relevant to that intent.
    pub params: ExtractedParameters,
}
