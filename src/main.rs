#![forbid(unsafe_code)]

//! `dinner-rotation` server binary.
//!
//! Loads configuration, opens the database, connects to Slack when a bot
//! token is available and serves the HTTP API until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use dinner_rotation::chat::ChatPlatform;
use dinner_rotation::config::GlobalConfig;
use dinner_rotation::http::{self, AppState};
use dinner_rotation::persistence::db;
use dinner_rotation::persistence::meal_repo::MealRepo;
use dinner_rotation::persistence::member_repo::MemberRepo;
use dinner_rotation::slack::client::SlackService;
use dinner_rotation::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "dinner-rotation", about = "Dinner rotation server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("dinner-rotation server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Err(err) = config.load_credentials().await {
        warn!(%err, "slack bot token unavailable; announcements disabled");
    }
    let config = Arc::new(config);
    info!(
        channel = config.slack.channel_id(),
        production = config.slack.production,
        "configuration loaded"
    );

    // ── Initialize database ─────────────────────────────
    let db = Arc::new(db::connect(&config.db_path).await?);
    info!("database connected");

    // ── Slack client ────────────────────────────────────
    let chat: Option<Arc<dyn ChatPlatform>> = if config.slack.bot_token.is_empty() {
        info!("slack not configured; running without chat platform");
        None
    } else {
        let service: Arc<dyn ChatPlatform> =
            Arc::new(SlackService::start(&config.slack).map_err(|err| {
                error!(%err, "slack service start failed");
                err
            })?);
        Some(service)
    };

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        meals: Arc::new(MealRepo::new(Arc::clone(&db))),
        members: Arc::new(MemberRepo::new(db)),
        chat,
    });

    // ── Serve HTTP ──────────────────────────────────────
    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let mut server = tokio::spawn(async move { http::serve(state, server_ct).await });

    let joined = tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            ct.cancel();
            server.await
        }
        joined = &mut server => joined,
    };

    match joined {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!(%err, "http server failed");
            return Err(err);
        }
        Err(err) => return Err(AppError::Http(format!("http server task failed: {err}"))),
    }

    info!("dinner-rotation shut down");
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
    let subscriber = fmt().with_env_filter(env_filter);

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
