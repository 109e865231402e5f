use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Serving certificate location for the admission webhook listener.
///
/// The directory follows the upstream webhook convention: it holds a
/// `tls.crt` bundle and a `tls.key` private key, typically projected from
/// a TLS secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionTlsConfig {
    pub cert_dir: PathBuf,
}

impl Default for AdmissionTlsConfig {
    fn default() -> Self {
        Self { cert_dir: PathBuf::from("/tmp/k8s-webhook-server/serving-certs") }
    }
}

impl AdmissionTlsConfig {
    /// Path of the certificate bundle inside the serving directory.
    pub fn cert_path(&self) -> PathBuf {
        self.cert_dir.join("tls.crt")
    }

    /// Path of the private key inside the serving directory.
    pub fn key_path(&self) -> PathBuf {
        self.cert_dir.join("tls.key")
    }

    /// Load the serving directory from environment variables.
    pub fn from_env() -> Self {
        let cert_dir = std::env::var("CERTSYNC_CERT_DIR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::default().cert_dir);

        Self { cert_dir }
    }
}
