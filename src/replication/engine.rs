//! Replication engine.
//!
//! Walks the TLS bindings of an Ingress and copies each referenced secret
//! from the source namespace into the Ingress namespace. Every failure is
//! per-binding: a missing source or a failed create never stops the
//! remaining bindings from being processed.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use super::labels::replica_labels;
use crate::domain::{Ingress, ObjectKey, Secret};
use crate::store::ObjectStore;

/// Copies TLS secrets referenced by Ingress declarations out of the source
/// namespace. Shared by the admission interceptor and both reconcilers.
#[derive(Clone)]
pub struct SecretReplicator {
    store: Arc<dyn ObjectStore>,
    source_namespace: String,
}

impl SecretReplicator {
    pub fn new(store: Arc<dyn ObjectStore>, source_namespace: impl Into<String>) -> Self {
        Self { store, source_namespace: source_namespace.into() }
    }

    /// The namespace replicas are copied from.
    pub fn source_namespace(&self) -> &str {
        &self.source_namespace
    }

    /// Ensure a replica exists for every TLS binding of the Ingress.
    ///
    /// Existing targets are left untouched, whatever their content. Returns
    /// the identities of the secrets created by this call, in binding order.
    #[instrument(skip(self, ingress), fields(ingress = %ingress.key()))]
    pub async fn ensure_replicas(&self, ingress: &Ingress) -> Vec<ObjectKey> {
        let mut created = Vec::new();
        let namespace = &ingress.metadata.namespace;

        for binding in ingress.tls_bindings() {
            debug!(
                "Found usage of Secret [{}] for Hosts {:?}",
                binding.secret_name, binding.hosts
            );
            if binding.secret_name.is_empty() {
                debug!("Skipping TLS binding for Hosts {:?} without a Secret name", binding.hosts);
                continue;
            }

            let target_key = ObjectKey::new(namespace.clone(), binding.secret_name.clone());
            match self.store.secret_exists(&target_key).await {
                Ok(true) => {
                    debug!(
                        "Skipping creation of the target Secret [{}] as it already exists",
                        target_key
                    );
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    error!("could not check for the target Secret [{}]: {}", target_key, err);
                    continue;
                }
            }

            let source_key =
                ObjectKey::new(self.source_namespace.clone(), binding.secret_name.clone());
            let source = match self.store.get_secret(&source_key).await {
                Ok(secret) => secret,
                Err(err) => {
                    error!("could not fetch the source Secret [{}]: {}", source_key, err);
                    continue;
                }
            };

            let replica = replica_of(&source, namespace);
            match self.store.create_secret(&replica).await {
                Ok(_) => {
                    info!("Successfully created Secret [{}]", target_key);
                    crate::observability::metrics::record_replica_created().await;
                    created.push(target_key);
                }
                Err(err) if err.is_already_exists() => {
                    debug!(
                        "Skipping creation of the target Secret [{}] as it already exists",
                        target_key
                    );
                }
                Err(err) => {
                    error!("failed to create the target Secret [{}]: {}", target_key, err);
                }
            }
        }

        created
    }
}

/// A copy of the source secret addressed to the given namespace, carrying
/// the replica labels instead of the source's own.
fn replica_of(source: &Secret, namespace: &str) -> Secret {
    let mut replica = Secret::new(
        namespace,
        source.metadata.name.clone(),
        source.secret_type.clone(),
        source.data.clone(),
    );
    replica.metadata.labels = replica_labels(&source.metadata.name);
    replica
}
