use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use gatorplan::config::AppConfig;
use gatorplan::db::StudentDb;
use gatorplan::requirements::load_selector;
use gatorplan::server::create_router;
use gatorplan::types::{build_catalog_client, AppState};

/// How often expired course info is swept from the cache.
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Build an `EnvFilter` from the given level, respecting `RUST_LOG` env var.
fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,gatorplan={level},tower_http={level}"))
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    config.validate().map_err(|e| anyhow!(e))?;

    let level = config.tracing_level().map_err(|e| anyhow!(e))?;
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(level))
        .init();

    let selector = load_selector(config.requirements_dir.as_deref())
        .context("Failed to load requirement data")?;
    let catalog_client =
        build_catalog_client(&config).context("Failed to build catalog client")?;
    let student_db = StudentDb::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;
    let addr = config.socket_addr().map_err(|e| anyhow!(e))?;

    let state = Arc::new(AppState::new(
        selector,
        catalog_client,
        student_db,
        config,
    ));

    let sweeper_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper_state.catalog_client.cleanup();
        }
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
