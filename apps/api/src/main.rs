//! # Voyage API server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  client ───► HTTP (8080) ───► routes ───► services ───► SQLite          │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                                        Redis / in-process cache         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use voyage_api::{router, ApiConfig, AppState};
use voyage_cache::{CacheManager, CacheStore, MemoryStore, RedisStore};
use voyage_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Voyage API server...");

    // Load configuration
    let config = ApiConfig::load().context("invalid configuration")?;
    info!(
        port = config.http_port,
        db_path = %config.database_path.display(),
        redis = config.redis_url.is_some(),
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(
        DbConfig::new(config.database_path.clone()).max_connections(config.database_max_connections),
    )
    .await
    .context("failed to open database")?;

    // Connect to Redis (optional)
    let store = cache_store(config.redis_url.as_deref()).await;
    let cache = CacheManager::new(store, config.cache_ttls.clone());

    let addr = config.socket_addr();
    let state = AppState::new(db.clone(), cache, config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Redis when a URL is configured and reachable, otherwise an in-process store.
async fn cache_store(redis_url: Option<&str>) -> Arc<dyn CacheStore> {
    if let Some(url) = redis_url {
        match RedisStore::connect(url).await {
            Ok(store) => return Arc::new(store),
            Err(e) => {
                warn!(error = %e, "Failed to connect to Redis, falling back to in-process cache");
            }
        }
    }
    Arc::new(MemoryStore::new())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
