#![forbid(unsafe_code)]

//! `bead-intercom` server binary.
//!
//! Bootstraps configuration, the beads API client, the health endpoint and
//! the Slack Socket Mode integration.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use bead_intercom::api::client::ApiClient;
use bead_intercom::bot::Bot;
use bead_intercom::config::GlobalConfig;
use bead_intercom::health;
use bead_intercom::slack::client::SlackService;
use bead_intercom::slack::BridgeState;
use bead_intercom::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "bead-intercom", about = "Slack front end for beads", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Run one message through the bot, print the reply as JSON, and exit.
    #[arg(long, value_name = "TEXT")]
    eval: Option<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("bead-intercom bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!(api = %config.api.base_url, "configuration loaded");

    let api = ApiClient::new(&config.api)?;
    let bot = Bot::new(&config, Arc::new(api));

    if let Some(text) = args.eval {
        let doc = bot.handle_message(&text).await;
        let rendered = serde_json::to_string_pretty(&doc)
            .map_err(|err| AppError::Io(format!("failed to encode reply: {err}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let ct = CancellationToken::new();

    // ── Health endpoint ─────────────────────────────────
    let health_ct = ct.clone();
    let health_port = config.http_port;
    let health_handle = tokio::spawn(async move {
        if let Err(err) = health::serve_health(health_port, health_ct).await {
            error!(%err, "health endpoint failed");
        }
    });

    // ── Slack ───────────────────────────────────────────
    let slack_tasks = if config.slack.is_configured() {
        let (service, queue_task) = SlackService::start(&config.slack).map_err(|err| {
            error!(%err, "slack service start failed");
            err
        })?;
        let slack = Arc::new(service);
        let state = Arc::new(BridgeState {
            bot,
            config: Arc::clone(&config),
            slack: Arc::clone(&slack),
        });
        let socket_task = slack.spawn_socket_mode(state, ct.clone());
        info!("slack socket mode started");
        Some((queue_task, socket_task))
    } else {
        info!("slack not configured; running in local-only mode");
        None
    };

    info!("bead-intercom ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    if let Some((queue_task, socket_task)) = slack_tasks {
        let _ = socket_task.await;
        queue_task.abort();
    }
    let _ = health_handle.await;
    info!("bead-intercom shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
