//! HTTP API server for the framing advisor

pub mod advise;
pub mod health;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::advisor::Advisor;

pub use advise::{AdviceRequest, AdviceResponse};

/// Default request body cap, sized for base64 camera frames (32 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared state for API handlers
pub struct ApiState {
    pub advisor: Arc<Advisor>,
    /// Oracle model identifier, for status reporting
    pub model: String,
    /// Largest accepted `/generate` body
    pub max_body_bytes: usize,
}

impl ApiState {
    /// State with the default body limit
    #[must_use]
    pub const fn new(advisor: Arc<Advisor>, model: String) -> Self {
        Self {
            advisor,
            model,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// API server
pub struct ApiServer {
    state: ApiState,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Create a server for the given advisor
    #[must_use]
    pub const fn new(advisor: Arc<Advisor>, model: String, host: String, port: u16) -> Self {
        Self {
            state: ApiState::new(advisor, model),
            host,
            port,
        }
    }

    /// Override the `/generate` body limit
    #[must_use]
    pub const fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.state.max_body_bytes = bytes;
        self
    }

    /// Build the router with all routes
    pub fn router(state: Arc<ApiState>) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(advise::router(state.clone()))
            .merge(health::router())
            .merge(health::ready_router(state))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server until Ctrl-C, then clear all sessions
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run the API server until `shutdown` resolves, then clear all sessions
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run_until(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(addr = %addr, "API server listening");

        let store = self.state.advisor.store().clone();
        let served = axum::serve(listener, Self::router(Arc::new(self.state)))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")));

        tracing::info!(sessions = store.len(), "cleaning up framing advisor sessions");
        store.clear();

        served
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
