//! # Blueprint Server
//!
//! Scan-orchestration service for the Blueprint onboarding dashboard.
//!
//! ## Overview
//!
//! The server fronts a code-analysis backend and provides:
//!
//! - **Scan dispatch**: structure, vision, contexts, build, photo,
//!   unused-code, and test-generation scans with per-kind status tracking
//! - **Progress streaming**: live scan progress frames over SSE
//! - **Decision queue**: AI findings surfaced as accept/reject decisions
//! - **Audit trail**: per-project event recording and "last run" hydration

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use blueprint_core::{BackendApi, BackendClient, ScanExecutor, events};
use blueprint_server::{AppState, ConfigLoader, routes};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "blueprint-server")]
#[command(about = "Scan orchestration and decision queue for the Blueprint dashboard")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "BLUEPRINT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "info,blueprint_server=debug,blueprint_core=debug".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("loading configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let base_url = config.backend_base_url()?;
    let api: Arc<dyn BackendApi> =
        Arc::new(BackendClient::new(base_url));
    let executor = Arc::new(ScanExecutor::standard(Arc::clone(&api)));
    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), Arc::clone(&executor));

    // Best effort: a cold backend should not keep the service down.
    match events::hydrate_last_runs(
        api.as_ref(),
        executor.registry(),
        executor.status_store(),
        state.project.id,
    )
    .await
    {
        Ok(applied) => info!(applied, "hydrated last-run timestamps"),
        Err(err) => warn!("last-run hydration failed: {err}"),
    }

    let app = routes::create_api_router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr()?;
    info!(%addr, project = %config.project().name, "blueprint server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
