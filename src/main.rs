mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use almaraz_example::{config, server, AppState};
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise pick levels from --verbose
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "almaraz_example=trace,tower_http=debug".to_string()
        } else {
            "almaraz_example=info,tower_http=info".to_string()
        }
    });
    tracing_subscriber::fmt().with_env_filter(&env_filter).init();

    // ── 1. Load config ───────────────────────────────────────────
    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // ── 2. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState::new(config)?);
    let config = state.config.clone();

    // ── 3. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!("Server listening on http://{addr}");
    tracing::info!("API base path   → {}", config.server.base_path);
    tracing::info!("Prometheus      → {}", config.metrics.path);

    axum::serve(listener, app)
        .await
        .context("Server exited with error")?;
    Ok(())
}
