//! Credential payloads and the TLS classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::object::{ObjectKey, ObjectMeta};

/// The secret type eligible for replication.
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";

/// Well-known data key holding the certificate chain.
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Well-known data key holding the private key.
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// A credential object. The source secret lives in the configured source
/// namespace; replicas carry the same name, type, and data in other
/// namespaces, plus the provenance labels attached at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Opaque classification. Only [`SECRET_TYPE_TLS`] is ever replicated.
    #[serde(default, rename = "type")]
    pub secret_type: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Secret {
    /// Create a secret with an explicit type and payload.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        secret_type: impl Into<String>,
        data: BTreeMap<String, Vec<u8>>,
    ) -> Self {
        Self { metadata: ObjectMeta::new(namespace, name), secret_type: secret_type.into(), data }
    }

    /// Create a TLS secret from certificate and private-key bytes.
    pub fn tls(
        namespace: impl Into<String>,
        name: impl Into<String>,
        cert: impl Into<Vec<u8>>,
        key: impl Into<Vec<u8>>,
    ) -> Self {
        let mut data = BTreeMap::new();
        data.insert(TLS_CERT_KEY.to_string(), cert.into());
        data.insert(TLS_PRIVATE_KEY_KEY.to_string(), key.into());
        Self::new(namespace, name, SECRET_TYPE_TLS, data)
    }

    /// The (namespace, name) identity of this secret.
    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    /// Whether this secret carries the TLS classification.
    pub fn is_tls(&self) -> bool {
        self.secret_type == SECRET_TYPE_TLS
    }
}
