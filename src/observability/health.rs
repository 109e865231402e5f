//! # Health Checking
//!
//! Liveness and readiness probes for the controller. The probe server
//! speaks plain HTTP so kubelets can reach it without the webhook's
//! serving certificate.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::config::HealthConfig;
use crate::errors::Error;

/// Tracks whether the controller is ready to serve traffic
#[derive(Debug, Clone)]
pub struct HealthChecker {
    ready: Arc<AtomicBool>,
}

impl HealthChecker {
    /// Create a new health checker that starts out not ready
    pub fn new() -> Self {
        Self { ready: Arc::new(AtomicBool::new(false)) }
    }

    /// Mark the controller ready to serve traffic
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Mark the controller not ready, failing readiness probes
    pub fn mark_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Check if the system is ready to serve traffic
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Check if the system is alive (basic liveness check)
    pub fn is_alive(&self) -> bool {
        // Basic liveness check - we're alive if we can respond
        true
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Router serving the probe endpoints.
pub fn build_router(checker: HealthChecker) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(checker)
}

async fn healthz(State(checker): State<HealthChecker>) -> impl IntoResponse {
    if checker.is_alive() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not alive")
    }
}

async fn readyz(State(checker): State<HealthChecker>) -> impl IntoResponse {
    if checker.is_ready() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

/// Bind the probe listener and serve until the shutdown signal fires.
pub async fn start_health_server(
    config: &HealthConfig,
    checker: HealthChecker,
    mut shutdown: watch::Receiver<bool>,
) -> crate::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| Error::config(format!("Invalid health address: {}", e)))?;

    let router = build_router(checker);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind health server: {}", e)))?;

    info!(address = %addr, "Starting health server");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
        .map_err(|e| Error::transport(format!("Health server error: {}", e)))?;

    info!("Health server shutdown completed");
    Ok(())
}
