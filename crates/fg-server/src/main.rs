//! Narrative-map service binary — wires settings, store, providers, and the
//! HTTP server together.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use fg_insights::{ChatService, NarrativeMapService};
use fg_llm::{
    AnthropicConfig, AnthropicProvider, OpenAiCompatConfig, OpenAiCompatProvider, Provider,
};
use fg_server::{FgServer, ServerConfig};
use fg_settings::{load_settings, load_settings_from_path};
use fg_store::ConnectionConfig;

/// Narrative-map service for the Finding Good coaching platform.
#[derive(Parser, Debug)]
#[command(name = "fg-server", about = "Finding Good narrative-map service")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Path to a settings file (default `~/.fg/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".fg").join("narrative.db")
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)?,
        None => load_settings()?,
    };

    let db_path = cli.db_path.unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;
    let db_path_str = db_path
        .to_str()
        .with_context(|| format!("db path is not valid UTF-8: {}", db_path.display()))?;
    let pool = fg_store::open(db_path_str, &ConnectionConfig::default())
        .context("failed to open the database")?;
    info!(path = %db_path.display(), "database ready");

    let anthropic_key =
        std::env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY not configured")?;
    let anthropic_config = AnthropicConfig {
        api_key: anthropic_key,
        model: settings.api.anthropic.model.clone(),
        base_url: settings.api.anthropic.base_url.clone(),
        max_tokens: settings.api.anthropic.max_tokens,
    };
    let narrative = Arc::new(NarrativeMapService::new(
        pool.clone(),
        Arc::new(AnthropicProvider::new(anthropic_config)),
    ));

    let chat_key = std::env::var("FG_CHAT_GATEWAY_KEY").unwrap_or_default();
    if chat_key.is_empty() {
        warn!("FG_CHAT_GATEWAY_KEY not configured; coaching chat will fail upstream auth");
    }
    let chat_provider: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::new(OpenAiCompatConfig {
        api_key: chat_key,
        model: settings.api.chat.model.clone(),
        base_url: settings.api.chat.base_url.clone(),
    }));
    let chat = Arc::new(ChatService::new(pool, chat_provider));

    let config = ServerConfig {
        host: cli.host.unwrap_or(settings.server.host),
        port: cli.port.unwrap_or(settings.server.port),
    };
    let server = FgServer::new(config, narrative, chat);

    let listener = tokio::net::TcpListener::bind((
        server.config().host.as_str(),
        server.config().port,
    ))
    .await
    .context("failed to bind")?;
    info!(addr = %listener.local_addr()?, "narrative-map service listening");

    axum::serve(listener, server.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
