//! Routing declarations and their TLS bindings.
//!
//! Ingress objects are read-only to certsync: they arrive through the
//! admission payload or the store's read path, and only their metadata and
//! `spec.tls` section are of interest.

use serde::{Deserialize, Serialize};

use super::object::{ObjectKey, ObjectMeta};

/// A TLS binding inside an Ingress spec: one secret serving a set of hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressTls {
    #[serde(default)]
    pub hosts: Vec<String>,

    #[serde(default)]
    pub secret_name: String,
}

impl IngressTls {
    /// Create a binding from a list of hosts and the serving secret's name.
    pub fn new(hosts: Vec<String>, secret_name: impl Into<String>) -> Self {
        Self { hosts, secret_name: secret_name.into() }
    }
}

/// The subset of an Ingress spec certsync reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressSpec {
    #[serde(default)]
    pub tls: Vec<IngressTls>,
}

/// A routing declaration. Declarations without a TLS section are valid and
/// simply yield no replication work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingress {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: IngressSpec,
}

impl Ingress {
    /// Create an Ingress with the given bindings.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, tls: Vec<IngressTls>) -> Self {
        Self { metadata: ObjectMeta::new(namespace, name), spec: IngressSpec { tls } }
    }

    /// The (namespace, name) identity of this declaration.
    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    /// The ordered TLS bindings declared by this Ingress.
    pub fn tls_bindings(&self) -> &[IngressTls] {
        &self.spec.tls
    }
}
