//! Docucache server
//!
//! Serves a product catalog through a read-through cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docucache::api::create_router;
use docucache::cache::{CacheBackend, MemoryCache, RedisCache};
use docucache::store::{DocumentStore, MemoryDocumentStore};
use docucache::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the Docucache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache store (Redis when configured, in-process otherwise)
/// 4. Open the document store
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docucache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Docucache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: namespace={}, collection={}, ttl entity/list/search={}/{}/{}s, port={}",
        config.namespace,
        config.collection,
        config.entity_ttl,
        config.list_ttl,
        config.search_ttl,
        config.server_port
    );

    let (cache, cleanup_handle) = open_cache(&config)?;
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    info!("Document store initialized (in-process)");

    let state = AppState::new(cache, store, &config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Opens the configured cache store.
///
/// The in-process store needs a sweep task to reclaim expired entries;
/// Redis expires keys itself.
fn open_cache(config: &Config) -> anyhow::Result<(Arc<dyn CacheBackend>, Option<JoinHandle<()>>)> {
    match &config.redis_url {
        Some(url) => {
            let cache: Arc<dyn CacheBackend> =
                Arc::new(RedisCache::open(url).context("invalid REDIS_URL")?);
            info!("Cache store: Redis at {}", url);
            Ok((cache, None))
        }
        None => {
            let memory = Arc::new(MemoryCache::new());
            let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            info!("Cache store: in-process, background cleanup task started");
            let cache: Arc<dyn CacheBackend> = memory;
            Ok((cache, Some(handle)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
