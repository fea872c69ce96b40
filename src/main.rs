#![forbid(unsafe_code)]

//! `internhub` — intern tracking server binary.
//!
//! Bootstraps configuration, connects the database, starts the overdue
//! sweep, and serves the HTTP API until ctrl-c or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use internhub::auth::Sessions;
use internhub::config::GlobalConfig;
use internhub::http::{self, AppState};
use internhub::persistence::db;
use internhub::services::overdue;
use internhub::services::task_service::TaskService;
use internhub::storage::FsBlobStore;
use internhub::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "internhub", about = "Intern tracking server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("internhub server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let config = match args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::from_toml_str("")?,
    };
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database and blob store ──────────────
    let db_path = config.db_path.to_string_lossy().to_string();
    let db = Arc::new(db::connect(&db_path).await?);
    info!("database connected");

    let blobs = Arc::new(FsBlobStore::new(config.blob_root.clone())?);

    // ── Build shared application state ──────────────────
    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        db: Arc::clone(&db),
        sessions: Sessions::default(),
        blobs,
    });

    // ── Start overdue sweep ─────────────────────────────
    let ct = CancellationToken::new();
    let sweep_handle = if config.overdue.enabled {
        Some(overdue::spawn_overdue_sweep(
            TaskService::new(db),
            config.overdue.sweep_interval_seconds,
            ct.clone(),
        ))
    } else {
        info!("overdue sweep disabled by config");
        None
    };

    // ── Serve HTTP until shutdown signal ────────────────
    let serve_ct = ct.clone();
    let serve_state = Arc::clone(&state);
    let server_handle = tokio::spawn(async move {
        if let Err(err) = http::serve(serve_state, serve_ct).await {
            tracing::error!(%err, "http server failed");
        }
    });

    info!("internhub ready");
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    let _ = server_handle.await;
    if let Some(handle) = sweep_handle {
        let _ = handle.await;
    }
    info!("internhub shut down");

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
