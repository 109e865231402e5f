//! Ingress admission interceptor.
//!
//! Reviews Ingress admissions and triggers replication for their TLS
//! bindings. The interceptor never blocks an admission on replication
//! problems: the only denying answer is for an object that does not decode
//! as an Ingress.

use serde_json::Value;
use tracing::{debug, instrument};

use super::review::{AdmissionRequest, AdmissionResponse};
use crate::domain::Ingress;
use crate::replication::SecretReplicator;

#[derive(Clone)]
pub struct IngressInterceptor {
    replicator: SecretReplicator,
}

impl IngressInterceptor {
    pub fn new(replicator: SecretReplicator) -> Self {
        Self { replicator }
    }

    /// Review one admission request and produce the response to send back.
    #[instrument(skip(self, request), fields(uid = %request.uid))]
    pub async fn review(&self, request: &AdmissionRequest) -> AdmissionResponse {
        debug!("Received request to mutate Ingress [{}/{}]", request.namespace, request.name);

        if request.namespace == self.replicator.source_namespace() {
            crate::observability::metrics::record_admission_review("skipped").await;
            return AdmissionResponse::allowed(
                request.uid.clone(),
                format!(
                    "Skipping mutation of Ingress [{}/{}] from the same namespace as the source",
                    request.namespace, request.name
                ),
            );
        }

        let raw = request.object.clone().unwrap_or(Value::Null);
        let ingress: Ingress = match serde_json::from_value(raw) {
            Ok(ingress) => ingress,
            Err(err) => {
                crate::observability::metrics::record_admission_review("rejected").await;
                return AdmissionResponse::errored(
                    request.uid.clone(),
                    400,
                    format!(
                        "failed to decode Ingress [{}/{}]: {}",
                        request.namespace, request.name, err
                    ),
                );
            }
        };

        let created = self.replicator.ensure_replicas(&ingress).await;
        if created.is_empty() {
            crate::observability::metrics::record_admission_review("unchanged").await;
            AdmissionResponse::allowed(request.uid.clone(), "No new Secrets created")
        } else {
            crate::observability::metrics::record_admission_review("created").await;
            let names: Vec<String> = created.iter().map(ToString::to_string).collect();
            AdmissionResponse::allowed(
                request.uid.clone(),
                format!("Successfully created Secrets [{}]", names.join(" ")),
            )
        }
    }
}
