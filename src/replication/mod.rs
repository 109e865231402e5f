//! Secret replication.
//!
//! The engine copies TLS secrets referenced by Ingress declarations from
//! the source namespace into the declaring namespace; the labels module
//! defines how replicas are marked and later discovered.

pub mod engine;
pub mod labels;

pub use engine::SecretReplicator;
pub use labels::{
    replica_labels, replica_selector, MANAGED_BY_LABEL, MANAGED_BY_VALUE, SOURCE_NAME_LABEL,
};
