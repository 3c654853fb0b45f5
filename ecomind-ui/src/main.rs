//! ecomind-ui - EcoMind web service entry point
//!
//! Classifies photos of waste items, suggests ways to cut appliance energy
//! use, and keeps a per-session eco score.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ecomind_common::classifier::shared_model;
use ecomind_common::config::{
    load_toml_config, resolve_config_path, ConfigOverrides, ServiceConfig, TomlConfig,
};
use ecomind_common::{TipBook, TipPicker, WasteClassifier};
use ecomind_ui::{build_router, AppState, SessionStore};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for ecomind-ui
#[derive(Parser, Debug)]
#[command(name = "ecomind-ui")]
#[command(about = "EcoMind waste classification and energy awareness service")]
#[command(version)]
struct Args {
    /// TOML config file (falls back to ECOMIND_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "ECOMIND_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ECOMIND_PORT")]
    port: Option<u16>,

    /// ONNX export of the waste classifier
    #[arg(long, env = "ECOMIND_MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// Eco tip file, one tip per line
    #[arg(long, env = "ECOMIND_TIPS_PATH")]
    tips_path: Option<PathBuf>,

    /// Minutes of inactivity before a session is discarded
    #[arg(long, env = "ECOMIND_SESSION_IDLE_MINUTES")]
    session_idle_minutes: Option<u64>,

    /// Fixed seed for tip-of-the-day selection
    #[arg(long, env = "ECOMIND_TIP_SEED")]
    tip_seed: Option<u64>,

    /// Maximum upload size in MiB
    #[arg(long, env = "ECOMIND_MAX_UPLOAD_MB")]
    max_upload_mb: Option<usize>,

    /// Log level directive (RUST_LOG takes precedence)
    #[arg(long, env = "ECOMIND_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            model_path: self.model_path.clone(),
            tips_path: self.tips_path.clone(),
            session_idle_minutes: self.session_idle_minutes,
            tip_seed: self.tip_seed,
            max_upload_mb: self.max_upload_mb,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before tracing so the configured level applies
    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };
    let config = ServiceConfig::resolve(&args.overrides(), &toml_config)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting EcoMind (ecomind-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    // Model loads once per process; without it the service still runs and
    // classification requests fail with 503
    let classifier = match shared_model(&config.model_path) {
        Ok(model) => {
            info!("✓ Waste classifier ready");
            WasteClassifier::new(model)
        }
        Err(e) => {
            error!("{}; waste classification disabled", e);
            WasteClassifier::unavailable()
        }
    };

    let tips = match TipBook::load(&config.tips_path) {
        Ok(book) => {
            info!("✓ Loaded {} eco tips", book.len());
            book
        }
        Err(e) => {
            warn!(
                "Could not read tips from {}: {}; tip of the day disabled",
                config.tips_path.display(),
                e
            );
            TipBook::default()
        }
    };

    let idle_timeout = config.idle_timeout().context("Invalid session idle timeout")?;
    let sessions = SessionStore::new(tips, TipPicker::from_seed(config.tip_seed), idle_timeout);
    let state = AppState::new(classifier, sessions, config.max_upload_bytes);
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("ecomind-ui listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
