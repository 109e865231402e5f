//! Ingress reconciler.
//!
//! Catch-up path for declarations the webhook missed or could not serve:
//! re-reads the Ingress and ensures a replica exists for every TLS
//! binding, exactly as the admission path would have.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::runner::{ReconcileError, Reconciler};
use crate::domain::{ObjectKey, ResourceKind};
use crate::replication::SecretReplicator;
use crate::store::ObjectStore;

pub struct IngressReconciler {
    store: Arc<dyn ObjectStore>,
    replicator: SecretReplicator,
}

impl IngressReconciler {
    pub fn new(store: Arc<dyn ObjectStore>, replicator: SecretReplicator) -> Self {
        Self { store, replicator }
    }
}

#[async_trait]
impl Reconciler for IngressReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Ingress
    }

    async fn reconcile(&self, key: &ObjectKey) -> Result<(), ReconcileError> {
        debug!("Received request to reconcile Ingress [{}]", key);

        if key.namespace == self.replicator.source_namespace() {
            debug!(
                "Skipping reconciliation of Ingress [{}] from the same namespace as the source",
                key
            );
            return Ok(());
        }

        let ingress = match self.store.get_ingress(key).await {
            Ok(ingress) => ingress,
            Err(err) if err.is_not_found() => {
                debug!("Skipping reconciliation of Ingress [{}] as it no longer exists", key);
                return Ok(());
            }
            Err(err) => {
                error!("could not fetch the Ingress [{}]: {}", key, err);
                return Err(ReconcileError::new(format!(
                    "could not fetch the Ingress [{}]: {}",
                    key, err
                )));
            }
        };

        self.replicator.ensure_replicas(&ingress).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ingress, IngressTls, Secret};
    use crate::store::MemoryStore;

    fn reconciler(store: &MemoryStore) -> IngressReconciler {
        let shared: Arc<dyn ObjectStore> = Arc::new(store.clone());
        IngressReconciler::new(shared.clone(), SecretReplicator::new(shared, "source"))
    }

    #[tokio::test]
    async fn test_creates_missing_replicas_for_declared_bindings() {
        let store = MemoryStore::new();
        store.upsert_secret(Secret::tls("source", "tls-example-io", "certificate", "private key")).await;
        store
            .upsert_ingress(Ingress::new(
                "target",
                "example-io",
                vec![IngressTls::new(vec!["example.io".into()], "tls-example-io")],
            ))
            .await;

        reconciler(&store).reconcile(&ObjectKey::new("target", "example-io")).await.unwrap();

        let replica = store.get_secret(&ObjectKey::new("target", "tls-example-io")).await.unwrap();
        assert!(replica.is_tls());
    }

    #[tokio::test]
    async fn test_source_namespace_declarations_are_ignored() {
        let store = MemoryStore::new();
        store
            .upsert_ingress(Ingress::new(
                "source",
                "example-io",
                vec![IngressTls::new(vec!["example.io".into()], "tls-example-io")],
            ))
            .await;

        reconciler(&store).reconcile(&ObjectKey::new("source", "example-io")).await.unwrap();

        // Short-circuits before even reading the declaration.
        assert_eq!(store.op_counts().ingress_gets, 0);
        assert_eq!(store.op_counts().secret_creates, 0);
    }

    #[tokio::test]
    async fn test_vanished_ingress_is_not_an_error() {
        let store = MemoryStore::new();
        let result = reconciler(&store).reconcile(&ObjectKey::new("target", "gone")).await;
        assert!(result.is_ok());
    }
}
