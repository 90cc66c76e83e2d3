//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize all subsystems in dependency order
//! - Open the subscription store, retrying the database under backoff
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when the store is ready)

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{load_config, AppConfig, ConfigError, StorageBackend};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::observability::{init_logging, init_metrics};
use crate::service::SubscriptionService;
use crate::storage::{ConnectError, MemoryStore, PgStore, SubscriptionStore};

/// Fatal error raised before the server starts serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("logging init failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),
    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("storage unavailable: {0}")]
    Storage(#[from] ConnectError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Future that completes when startup should stop waiting on storage:
/// either the optional deadline passes or shutdown is triggered.
pub fn startup_cancel(
    timeout: Option<Duration>,
    mut shutdown: broadcast::Receiver<()>,
) -> impl Future<Output = ()> {
    async move {
        let deadline = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = deadline => tracing::warn!(timeout = ?timeout, "Startup deadline reached"),
            _ = shutdown.recv() => tracing::info!("Shutdown requested during startup"),
        }
    }
}

/// Open the configured subscription store.
pub async fn open_store(
    config: &AppConfig,
    shutdown: &Shutdown,
) -> Result<Arc<dyn SubscriptionStore>, StartupError> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let cancel = startup_cancel(
                config.postgres.retry.startup_timeout(),
                shutdown.subscribe(),
            );
            let store = PgStore::connect(&config.postgres, cancel).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Run the service from the config file at `path` until shutdown.
pub async fn run(path: &Path) -> Result<(), StartupError> {
    let config = load_config(path)?;

    init_logging(&config)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %config.env,
        storage = ?config.storage,
        bind_address = %config.http_server.bind_address,
        "subscription-tracker starting"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        init_metrics(addr)?;
        tracing::info!(address = %addr, "Metrics exporter listening");
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_handler(shutdown.clone());

    let store = open_store(&config, &shutdown).await?;
    let service = SubscriptionService::new(store);
    let server = HttpServer::new(config.http_server.clone(), service);

    let listener = TcpListener::bind(&config.http_server.bind_address).await?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cancel_fires_at_deadline() {
        let shutdown = Shutdown::new();
        let started = tokio::time::Instant::now();

        startup_cancel(Some(Duration::from_secs(30)), shutdown.subscribe()).await;
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_fires_on_shutdown() {
        let shutdown = Shutdown::new();
        let cancel = startup_cancel(None, shutdown.subscribe());
        shutdown.trigger();

        let started = tokio::time::Instant::now();
        cancel.await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_memory_backend_opens_without_database() {
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };

        let store = open_store(&config, &Shutdown::new()).await.unwrap();
        assert_eq!(store.backend_type(), "memory");
        assert!(store.ping().await.is_ok());
    }
}
