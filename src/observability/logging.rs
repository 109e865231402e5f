//! # Structured Logging
//!
//! Subscriber setup and startup configuration logging using the tracing
//! ecosystem.

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level so operators can
/// raise verbosity per module without touching the deployment.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", default_level(config));
    }

    let installed = if config.json_logging {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).json().finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish(),
        )
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
    Ok(())
}

fn default_level(config: &ObservabilityConfig) -> String {
    let level = config.log_level.to_lowercase();
    // Accept `warning` since existing deployments spell it that way.
    if level == "warning" {
        "warn".to_string()
    } else {
        level
    }
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        source_namespace = %config.replication.source_namespace,
        admission_address = %format!("{}:{}", config.admission.bind_address, config.admission.port),
        health_address = %format!("{}:{}", config.health.bind_address, config.health.port),
        metrics_enabled = %config.observability.enable_metrics,
        leader_election = %config.lease.is_configured(),
        "Certsync controller configuration"
    );
}
