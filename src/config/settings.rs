//! Configuration settings for the certsync controller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::tls::AdmissionTlsConfig;
use crate::errors::{Error, Result};

/// Recognized log level names, including the `warning` alias.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Replication behavior
    #[validate(nested)]
    pub replication: ReplicationConfig,

    /// Admission webhook listener
    #[validate(nested)]
    pub admission: AdmissionConfig,

    /// Health endpoint listener
    #[validate(nested)]
    pub health: HealthConfig,

    /// Logging and metrics
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Reconcile retry pacing
    #[validate(nested)]
    pub controller: ControllerConfig,

    /// Leader election lease identifiers
    pub lease: LeaseConfig,
}

impl AppConfig {
    /// Assemble the configuration from environment variables, falling back
    /// to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self {
            replication: ReplicationConfig::from_env(),
            admission: AdmissionConfig::from_env(),
            health: HealthConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
            controller: ControllerConfig::from_env(),
            lease: LeaseConfig::from_env(),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if self.admission.port == self.health.port {
            return Err(Error::config("Admission and health ports cannot be the same"));
        }

        if self.observability.enable_metrics && self.observability.metrics_port != 0 {
            if self.observability.metrics_port == self.admission.port {
                return Err(Error::config("Metrics and admission ports cannot be the same"));
            }
            if self.observability.metrics_port == self.health.port {
                return Err(Error::config("Metrics and health ports cannot be the same"));
            }
        }

        let level = self.observability.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::config(format!(
                "Unknown log level '{}', expected one of {}",
                self.observability.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.controller.initial_backoff_ms > self.controller.max_backoff_ms {
            return Err(Error::config("Initial backoff cannot exceed the maximum backoff"));
        }

        Ok(())
    }
}

/// Replication behavior
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct ReplicationConfig {
    /// Namespace the source secrets live in
    #[validate(length(min = 1, message = "Source namespace cannot be empty"))]
    pub source_namespace: String,
}

impl ReplicationConfig {
    /// Create ReplicationConfig from environment variables
    pub fn from_env() -> Self {
        Self { source_namespace: std::env::var("CERTSYNC_SOURCE_NAMESPACE").unwrap_or_default() }
    }
}

/// Admission webhook listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdmissionConfig {
    /// Webhook bind address
    #[validate(length(min = 1, message = "Admission bind address cannot be empty"))]
    pub bind_address: String,

    /// Webhook port
    #[validate(range(min = 1, max = 65535, message = "Admission port must be between 1 and 65535"))]
    pub port: u16,

    /// Serving certificate location
    pub tls: AdmissionTlsConfig,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0".to_string(), port: 8443, tls: AdmissionTlsConfig::default() }
    }
}

impl AdmissionConfig {
    /// Create AdmissionConfig from environment variables
    pub fn from_env() -> Self {
        let bind_address = std::env::var("CERTSYNC_ADMISSION_BIND_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("CERTSYNC_ADMISSION_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8443);

        Self { bind_address, port, tls: AdmissionTlsConfig::from_env() }
    }
}

/// Health endpoint listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HealthConfig {
    /// Health bind address
    #[validate(length(min = 1, message = "Health bind address cannot be empty"))]
    pub bind_address: String,

    /// Health port
    #[validate(range(min = 1, max = 65535, message = "Health port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl HealthConfig {
    /// Create HealthConfig from environment variables
    pub fn from_env() -> Self {
        let bind_address =
            std::env::var("CERTSYNC_HEALTH_BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("CERTSYNC_HEALTH_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        Self { bind_address, port }
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Enable metrics collection
    pub enable_metrics: bool,

    /// Metrics server port (0 = disabled)
    #[validate(range(max = 65535, message = "Metrics port must be <= 65535"))]
    pub metrics_port: u16,

    /// Service name attached to exported metrics
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, warning, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            metrics_port: 8081,
            service_name: "certsync".to_string(),
            log_level: "warning".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.metrics_port == 0 {
            None
        } else {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        }
    }

    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let enable_metrics = std::env::var("CERTSYNC_ENABLE_METRICS")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(true);

        let metrics_port = std::env::var("CERTSYNC_METRICS_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8081);

        let service_name =
            std::env::var("CERTSYNC_SERVICE_NAME").unwrap_or_else(|_| "certsync".to_string());

        let log_level =
            std::env::var("CERTSYNC_LOG_LEVEL").unwrap_or_else(|_| "warning".to_string());

        let json_logging = std::env::var("CERTSYNC_JSON_LOGGING")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        Self { enable_metrics, metrics_port, service_name, log_level, json_logging }
    }
}

/// Reconcile retry pacing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ControllerConfig {
    /// Delay before the first retry of a failed reconcile, in milliseconds
    #[validate(range(min = 1, max = 60_000, message = "Initial backoff must be between 1ms and 60s"))]
    pub initial_backoff_ms: u64,

    /// Upper bound for the retry delay, in milliseconds
    #[validate(range(min = 1, max = 3_600_000, message = "Max backoff must be between 1ms and 1h"))]
    pub max_backoff_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { initial_backoff_ms: 200, max_backoff_ms: 30_000 }
    }
}

impl ControllerConfig {
    /// Get the initial retry delay as Duration
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Get the retry delay cap as Duration
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Create ControllerConfig from environment variables
    pub fn from_env() -> Self {
        let initial_backoff_ms = std::env::var("CERTSYNC_INITIAL_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(200);

        let max_backoff_ms = std::env::var("CERTSYNC_MAX_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30_000);

        Self { initial_backoff_ms, max_backoff_ms }
    }
}

/// Leader election lease identifiers. Carried through configuration and
/// surfaced in startup logs; election itself is delegated to the
/// deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LeaseConfig {
    /// Lease resource name
    pub name: String,

    /// Namespace holding the lease resource
    pub namespace: String,
}

impl LeaseConfig {
    /// Whether lease identifiers were provided
    pub fn is_configured(&self) -> bool {
        !self.name.is_empty()
    }

    /// Create LeaseConfig from environment variables
    pub fn from_env() -> Self {
        Self {
            name: std::env::var("CERTSYNC_LEASE_NAME").unwrap_or_default(),
            namespace: std::env::var("CERTSYNC_LEASE_NAMESPACE").unwrap_or_default(),
        }
    }
}
