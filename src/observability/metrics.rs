//! # Metrics Collection
//!
//! Provides Prometheus metrics collection for the replication controller.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use ::tracing::{info, warn};
use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Metrics recorder that tracks replication activity
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record an admission review outcome
    pub fn record_admission_review(&self, outcome: &str) {
        counter!("admission_reviews_total").increment(1);

        let labels = [("outcome", outcome.to_string())];
        counter!("admission_reviews_total", &labels).increment(1);
    }

    /// Record a replica Secret created in a target namespace
    pub fn record_replica_created(&self) {
        counter!("replicas_created_total").increment(1);
    }

    /// Record a replica Secret refreshed from its source
    pub fn record_replica_refreshed(&self) {
        counter!("replicas_refreshed_total").increment(1);
    }

    /// Record a reconciliation outcome for a resource kind
    pub fn record_reconciliation(&self, kind: &str, outcome: &str) {
        let labels = [("kind", kind.to_string()), ("outcome", outcome.to_string())];
        counter!("reconciliations_total", &labels).increment(1);
    }

    /// Record a lagged watch subscription that dropped events
    pub fn record_watch_lagged(&self, kind: &str) {
        let labels = [("kind", kind.to_string())];
        counter!("watch_lag_events_total", &labels).increment(1);
    }

    /// Register replication metrics so Prometheus exports appear before events occur.
    pub fn register_replication_metrics(&self) {
        describe_counter!(
            "admission_reviews_total",
            Unit::Count,
            "Admission reviews handled, grouped by outcome"
        );
        describe_counter!(
            "replicas_created_total",
            Unit::Count,
            "Replica Secrets created in target namespaces"
        );
        describe_counter!(
            "replicas_refreshed_total",
            Unit::Count,
            "Replica Secrets refreshed from their source"
        );
        describe_counter!(
            "reconciliations_total",
            Unit::Count,
            "Reconciliation attempts grouped by kind and outcome"
        );
        describe_counter!(
            "watch_lag_events_total",
            Unit::Count,
            "Watch subscriptions that lagged and dropped events"
        );

        counter!("admission_reviews_total").absolute(0);
        counter!("replicas_created_total").absolute(0);
        counter!("replicas_refreshed_total").absolute(0);

        const OUTCOMES: &[&str] = &["skipped", "rejected", "unchanged", "created"];
        for outcome in OUTCOMES {
            counter!("admission_reviews_total", "outcome" => *outcome).absolute(0);
        }

        const KINDS: &[&str] = &["Ingress", "Secret"];
        for kind in KINDS {
            counter!("reconciliations_total", "kind" => *kind, "outcome" => "success").absolute(0);
            counter!("reconciliations_total", "kind" => *kind, "outcome" => "retry").absolute(0);
            counter!("watch_lag_events_total", "kind" => *kind).absolute(0);
        }
    }
}

/// Global metrics recorder instance
static METRICS: once_cell::sync::Lazy<Arc<RwLock<Option<MetricsRecorder>>>> =
    once_cell::sync::Lazy::new(|| Arc::new(RwLock::new(None)));

/// Initialize metrics collection and Prometheus exporter
pub async fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => {
            warn!("Metrics disabled: no bind address configured");
            return Ok(());
        }
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        Error::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    // Initialize Prometheus exporter
    let builder = PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name);

    builder
        .install()
        .map_err(|e| Error::config(format!("Failed to initialize metrics exporter: {}", e)))?;

    // Create and store global metrics recorder
    let recorder = MetricsRecorder::new();
    {
        let mut metrics = METRICS.write().await;
        *metrics = Some(recorder.clone());
    }

    recorder.register_replication_metrics();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );

    Ok(())
}

/// Get the global metrics recorder
pub async fn get_metrics() -> Option<MetricsRecorder> {
    METRICS.read().await.clone()
}

/// Record an admission review outcome using the global metrics recorder
pub async fn record_admission_review(outcome: &str) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_admission_review(outcome);
    }
}

/// Record a created replica Secret using the global metrics recorder
pub async fn record_replica_created() {
    if let Some(metrics) = get_metrics().await {
        metrics.record_replica_created();
    }
}

/// Record a refreshed replica Secret using the global metrics recorder
pub async fn record_replica_refreshed() {
    if let Some(metrics) = get_metrics().await {
        metrics.record_replica_refreshed();
    }
}

/// Record a reconciliation outcome using the global metrics recorder
pub async fn record_reconciliation(kind: &str, outcome: &str) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_reconciliation(kind, outcome);
    }
}

/// Record a lagged watch subscription using the global metrics recorder
pub async fn record_watch_lagged(kind: &str) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_watch_lagged(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recorder_creation() {
        let recorder = MetricsRecorder::new();
        recorder.record_admission_review("created");
    }

    #[test]
    fn test_metrics_recording() {
        let recorder = MetricsRecorder::new();

        recorder.record_admission_review("skipped");
        recorder.record_admission_review("rejected");
        recorder.record_admission_review("unchanged");
        recorder.record_admission_review("created");

        recorder.record_replica_created();
        recorder.record_replica_refreshed();

        recorder.record_reconciliation("Ingress", "success");
        recorder.record_reconciliation("Secret", "retry");

        recorder.record_watch_lagged("Ingress");
        recorder.record_watch_lagged("Secret");
    }

    #[tokio::test]
    async fn test_init_metrics_disabled() {
        let config = ObservabilityConfig { enable_metrics: false, ..Default::default() };

        let result = init_metrics(&config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_init_metrics_no_port() {
        let config =
            ObservabilityConfig { enable_metrics: true, metrics_port: 0, ..Default::default() };

        let result = init_metrics(&config).await;
        assert!(result.is_ok());
    }
}
