//! Source secret reconciler.
//!
//! Fans a changed source secret out to its replicas. Discovery is by
//! label only: every secret carrying the replica labels for this source
//! name gets its payload refreshed. Missing replicas are never created
//! here; that is the Ingress paths' job.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use super::runner::{ReconcileError, Reconciler};
use crate::domain::{ObjectKey, ResourceKind};
use crate::replication::replica_selector;
use crate::store::ObjectStore;

pub struct SecretReconciler {
    store: Arc<dyn ObjectStore>,
    source_namespace: String,
}

impl SecretReconciler {
    pub fn new(store: Arc<dyn ObjectStore>, source_namespace: impl Into<String>) -> Self {
        Self { store, source_namespace: source_namespace.into() }
    }
}

#[async_trait]
impl Reconciler for SecretReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Secret
    }

    async fn reconcile(&self, key: &ObjectKey) -> Result<(), ReconcileError> {
        debug!("Received request to reconcile Secret [{}]", key);

        if key.namespace != self.source_namespace {
            debug!(
                "Skipping reconciliation of Secret [{}] as it is not from the source namespace",
                key
            );
            return Ok(());
        }

        let source = match self.store.get_secret(key).await {
            Ok(secret) => secret,
            Err(err) if err.is_not_found() => {
                debug!("Skipping reconciliation of Secret [{}] as it no longer exists", key);
                return Ok(());
            }
            Err(err) => {
                error!("could not fetch the source Secret [{}]: {}", key, err);
                return Err(ReconcileError::new(format!(
                    "could not fetch the source Secret [{}]: {}",
                    key, err
                )));
            }
        };

        if !source.is_tls() {
            debug!("Skipping reconciliation of Secret [{}] as it is not a TLS Secret", key);
            return Ok(());
        }

        let targets = match self.store.list_secrets(&replica_selector(&key.name)).await {
            Ok(targets) => targets,
            Err(err) => {
                error!("could not list Secrets: {}", err);
                return Err(ReconcileError::new(format!("could not list Secrets: {}", err)));
            }
        };

        for target in targets {
            let target_key = target.key();
            debug!("Found target Secret [{}] to be copied from source Secret [{}]", target_key, key);

            let mut replica = match self.store.get_secret(&target_key).await {
                Ok(secret) => secret,
                Err(err) => {
                    error!("could not fetch the target Secret [{}]: {}", target_key, err);
                    continue;
                }
            };

            replica.secret_type = source.secret_type.clone();
            replica.data = source.data.clone();
            match self.store.update_secret(&replica).await {
                Ok(_) => {
                    info!("Successfully updated Secret [{}]", target_key);
                    crate::observability::metrics::record_replica_refreshed().await;
                }
                Err(err) if err.is_conflict() => {
                    debug!(
                        "Skipping update of the target Secret [{}] as it was modified concurrently",
                        target_key
                    );
                }
                Err(err) => {
                    error!("failed to update target Secret [{}]: {}", target_key, err);
                }
            }
        }

        Ok(())
    }
}
