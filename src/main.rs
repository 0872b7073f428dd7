// diary-edge - rate-limited, cache-fronted edge API for the diary app

use anyhow::Result;
use clap::Parser;
use diary_edge::ai::AiGateway;
use diary_edge::cli::Args;
use diary_edge::config::AppConfig;
use diary_edge::server::{create_router, AppState};
use diary_edge::store::{KvStore, MemoryStore};
use diary_edge::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting diary-edge v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Key-value stores for cached previews and rate-limit windows
    let cache_store = MemoryStore::new();
    let rate_limit_store = MemoryStore::new();
    cache_store.spawn_janitor("ogp_cache", Duration::from_secs(60));
    rate_limit_store.spawn_janitor("rate_limit", Duration::from_secs(60));

    // Phase 4: AI backend (absent key means fallback answers)
    let ai = AiGateway::from_config(&config.gemini)?;
    info!("AI backend: {}", ai.model().unwrap_or("not configured"));

    // Phase 5: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(
        config,
        Arc::new(cache_store) as Arc<dyn KvStore>,
        Arc::new(rate_limit_store) as Arc<dyn KvStore>,
        ai,
    )?;
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
