//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the API router in an Axum service
//! - Wire up transport limits (request timeout, body size)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown, up to a deadline
//!
//! # Design Decisions
//! - Axum only provides the transport; all routing happens in `crate::routing`
//! - Every request enters through the Axum fallback and is dispatched from there

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::HttpServerConfig;
use crate::http::routes::api_router;
use crate::routing::Router;
use crate::service::SubscriptionService;

/// HTTP server for the subscription API.
pub struct HttpServer {
    app: axum::Router,
    config: HttpServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `service`.
    pub fn new(config: HttpServerConfig, service: SubscriptionService) -> Self {
        let router = Arc::new(api_router(service));
        let app = Self::build_app(&config, router);
        Self { app, config }
    }

    /// Build the Axum app with all transport layers.
    #[allow(deprecated)]
    fn build_app(config: &HttpServerConfig, router: Arc<Router>) -> axum::Router {
        axum::Router::new()
            .fallback(move |request: Request<Body>| {
                let router = router.clone();
                async move { router.dispatch(request).await }
            })
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
    }

    /// Run the server until `shutdown` fires, then drain connections.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut drain_signal = shutdown.resubscribe();
        let drain_timeout = Duration::from_secs(self.config.shutdown_timeout_secs);

        let server = axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .into_future();

        tokio::select! {
            result = server => result?,
            _ = async {
                let _ = drain_signal.recv().await;
                tokio::time::sleep(drain_timeout).await;
            } => {
                tracing::warn!(timeout = ?drain_timeout, "Drain timeout elapsed, dropping open connections");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }
}
