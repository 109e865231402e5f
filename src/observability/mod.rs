//! # Observability Infrastructure
//!
//! This module provides observability for the replication controller,
//! including structured logging, metrics collection, and health checking.

pub mod health;
pub mod logging;
pub mod metrics;

pub use health::{start_health_server, HealthChecker};
pub use logging::{init_logging, log_config_info};
pub use metrics::{init_metrics, MetricsRecorder};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize all observability components
///
/// Returns the health checker the probe server and startup sequence share.
pub async fn init_observability(config: &ObservabilityConfig) -> Result<HealthChecker> {
    init_logging(config)?;

    // Initialize metrics if enabled
    if config.enable_metrics {
        init_metrics(config).await?;
    }

    // Create and return health checker
    let health_checker = HealthChecker::new();

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        metrics_enabled = %config.enable_metrics,
        "Observability initialized successfully"
    );

    Ok(health_checker)
}
