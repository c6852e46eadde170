//! Global configuration parsing, validation, and credential loading.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::{AppError, Result};

/// Keychain service name holding this bot's credentials.
pub const KEYRING_SERVICE: &str = "bead-intercom";

/// Projects the bot recognizes by name in free text, in match-priority order.
pub const DEFAULT_KNOWN_PROJECTS: &[&str] =
    &["os", "3dl", "website", "mag-shield", "galtrader", "vms"];

/// Item-key prefix to project name.
pub const DEFAULT_PREFIX_PROJECTS: &[(&str, &str)] = &[
    ("os", "os"),
    ("3dl", "3dl"),
    ("website", "website"),
    ("mag", "mag-shield"),
    ("galtrader", "galtrader"),
    ("vms", "vms"),
];

/// Slack connectivity settings.
///
/// Tokens are loaded at runtime via OS keychain or environment variables,
/// never from the TOML config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// App-level token used for Socket Mode (populated at runtime).
    #[serde(skip)]
    pub app_token: String,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

impl SlackConfig {
    /// Whether both Socket Mode tokens are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.app_token.is_empty() && !self.bot_token.is_empty()
    }
}

/// Beads REST API connection settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL of the REST API, without the `/api/v1` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Actor name recorded by the tracker for write operations.
    #[serde(default = "default_actor")]
    pub actor: String,
    /// Bearer token (populated at runtime; `None` means no auth header).
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            actor: default_actor(),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Fixed project lookup tables, loaded once at start and never mutated.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ProjectCatalog {
    /// Known project names, in match-priority order.
    #[serde(default = "default_known_projects")]
    pub known: Vec<String>,
    /// Item-key prefix to project name.
    #[serde(default = "default_prefixes")]
    pub prefixes: HashMap<String, String>,
}

impl Default for ProjectCatalog {
    fn default() -> Self {
        Self {
            known: default_known_projects(),
            prefixes: default_prefixes(),
        }
    }
}

impl ProjectCatalog {
    /// Project mapped to an item-key prefix, if any.
    #[must_use]
    pub fn project_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }
}

fn default_base_url() -> String {
    "http://localhost:3131".into()
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_actor() -> String {
    "slack-bot".into()
}

fn default_known_projects() -> Vec<String> {
    DEFAULT_KNOWN_PROJECTS
        .iter()
        .map(|p| (*p).to_owned())
        .collect()
}

fn default_prefixes() -> HashMap<String, String> {
    DEFAULT_PREFIX_PROJECTS
        .iter()
        .map(|(prefix, project)| ((*prefix).to_owned(), (*project).to_owned()))
        .collect()
}

fn default_bot_name() -> String {
    "Beads".into()
}

fn default_http_port() -> u16 {
    3978
}

fn default_close_reason() -> String {
    "Closed via Slack".into()
}

fn default_slash_command() -> String {
    "/beads".into()
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Display name used in help and fallback cards.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// HTTP port for the health endpoint.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Close reason used when a close submission carries none.
    #[serde(default = "default_close_reason")]
    pub default_close_reason: String,
    /// Slack user IDs allowed to talk to the bot; empty allows everyone.
    #[serde(default)]
    pub authorized_user_ids: Vec<String>,
    /// Slash command the bot answers to.
    #[serde(default = "default_slash_command")]
    pub slash_command: String,
    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Project lookup tables.
    #[serde(default)]
    pub projects: ProjectCatalog,
    /// Slack credentials.
    #[serde(default)]
    pub slack: SlackConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            http_port: default_http_port(),
            default_close_reason: default_close_reason(),
            authorized_user_ids: Vec::new(),
            slash_command: default_slash_command(),
            api: ApiConfig::default(),
            projects: ProjectCatalog::default(),
            slack: SlackConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load Slack and API credentials from OS keychain with env-var fallback.
    ///
    /// Missing credentials are not an error: without Slack tokens the server
    /// runs in local-only mode, and without an API token requests carry no
    /// `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the keychain lookup task fails.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.app_token = load_credential("slack_app_token", "SLACK_APP_TOKEN")
            .await?
            .unwrap_or_default();
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN")
            .await?
            .unwrap_or_default();
        self.api.token = load_credential("beads_api_token", "BEADS_API_TOKEN").await?;

        info!(
            slack = self.slack.is_configured(),
            api_auth = self.api.token.is_some(),
            "credentials loaded"
        );
        Ok(())
    }

    /// Whether a Slack user may interact with the bot.
    #[must_use]
    pub fn is_authorized(&self, user_id: &str) -> bool {
        self.authorized_user_ids.is_empty() || self.authorized_user_ids.iter().any(|id| id == user_id)
    }

    fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api.base_url must be an http(s) URL, got '{base}'"
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(AppError::Config(
                "api.timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.bot_name.trim().is_empty() {
            return Err(AppError::Config("bot_name must not be empty".into()));
        }

        if !self.slash_command.starts_with('/') {
            return Err(AppError::Config(format!(
                "slash_command must start with '/', got '{}'",
                self.slash_command
            )));
        }

        if let Some((prefix, project)) = self
            .projects
            .prefixes
            .iter()
            .find(|(_, project)| !self.projects.known.contains(project))
        {
            return Err(AppError::Config(format!(
                "projects.prefixes maps '{prefix}' to unknown project '{project}'"
            )));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
///
/// Returns `Ok(None)` when neither source has a non-empty value.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<Option<String>> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(Some(value)),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            tracing::debug!(key = keyring_key, ?err, "keychain lookup failed, trying env var");
        }
    }

    Ok(env::var(env_key).ok().filter(|value| !value.is_empty()))
}
