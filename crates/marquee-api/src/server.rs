//! Marquee API server with worker lifecycle and graceful shutdown

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::jobs::{InsertMovieHandler, INSERT_MOVIE};
use crate::middleware::{body_limit_layer, cors_layer, request_id_middleware, timeout_layer};
use crate::routes::api_router;
use crate::state::AppState;
use marquee_catalog::CatalogStore;
use marquee_persist::{Database, SqliteCatalog, SqliteJobStore};
use marquee_queue::{JobStore, Worker, WorkerConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server address
    pub addr: SocketAddr,
    /// Request timeout
    pub timeout: Duration,
    /// Max request body size (bytes)
    pub max_body_size: usize,
    /// Worker polling interval
    pub poll_interval: Duration,
    /// SQLite database URL
    pub database_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".parse().unwrap(),
            timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MB
            poll_interval: Duration::from_secs(5),
            database_url: "sqlite:marquee.db?mode=rwc".to_string(),
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port: u16 = std::env::var("MARQUEE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let timeout_secs: u64 = std::env::var("MARQUEE_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(30);

        let poll_secs: u64 = std::env::var("MARQUEE_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(5);

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| defaults.database_url.clone());

        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            timeout: Duration::from_secs(timeout_secs),
            max_body_size: defaults.max_body_size,
            poll_interval: Duration::from_secs(poll_secs),
            database_url,
        }
    }
}

/// Marquee API server
///
/// Owns the worker lifecycle: the polling task starts when `run` is called
/// and is stopped after the HTTP side drains.
pub struct MarqueeServer {
    config: ServerConfig,
    app_state: AppState,
    worker: Worker<dyn JobStore>,
}

impl MarqueeServer {
    /// Create a new server: connect storage, wire the worker, build state.
    pub async fn new(config: ServerConfig) -> Result<Self, ApiError> {
        let db = Database::connect(&config.database_url)
            .await
            .map_err(|e| ApiError::Internal(format!("database init failed: {e}")))?;

        let jobs: Arc<dyn JobStore> = Arc::new(SqliteJobStore::new(db.pool().clone()));
        let catalog: Arc<dyn CatalogStore> = Arc::new(SqliteCatalog::new(db.pool().clone()));

        let mut worker = Worker::new(
            jobs.clone(),
            WorkerConfig {
                poll_interval: config.poll_interval,
            },
        );
        worker.register(INSERT_MOVIE, Arc::new(InsertMovieHandler::new(catalog.clone())));

        let app_state = AppState::new(jobs, catalog);

        Ok(Self {
            config,
            app_state,
            worker,
        })
    }

    /// Get the configured router
    pub fn router(&self) -> Router {
        api_router(self.app_state.clone())
            // Order matters - bottom to top execution
            .layer(body_limit_layer(self.config.max_body_size))
            .layer(timeout_layer(self.config.timeout))
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server with graceful shutdown
    pub async fn run(self) -> Result<(), ApiError> {
        let app = self.router();
        let addr = self.config.addr;

        let worker = self.worker.start();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("marquee listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal(format!("server error: {e}")))?;

        // Let any in-flight tick finish before exiting.
        worker.stop().await;
        tracing::info!("server shutdown complete");
        Ok(())
    }
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
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Initialize tracing subscriber
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,marquee_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }
}
