//! Common test fixtures for all integration tests.

#![allow(dead_code)]

use certsync::domain::{Ingress, IngressTls, Secret};

/// An Ingress named `example-io` that terminates TLS for `example.io`
/// with the Secret `tls-example-io`.
pub fn example_ingress(namespace: &str) -> Ingress {
    Ingress::new(
        namespace,
        "example-io",
        vec![IngressTls::new(vec!["example.io".to_string()], "tls-example-io")],
    )
}

/// The matching source Secret for [`example_ingress`].
pub fn tls_secret(namespace: &str) -> Secret {
    Secret::tls(namespace, "tls-example-io", "certificate", "private key")
}
