//! Domain layer
//!
//! Pure object-model types for the resources certsync works with, with zero
//! infrastructure dependencies. The wire shapes mirror the Kubernetes objects
//! the admission payload carries (camelCase fields, `spec.tls` bindings,
//! string resource versions).
//!
//! ## Module Organization
//!
//! - `object`: Namespaced identities and shared object metadata
//! - `ingress`: Routing declarations and their TLS bindings
//! - `secret`: Credential payloads and the TLS classification

pub mod ingress;
pub mod object;
pub mod secret;

pub use ingress::{Ingress, IngressSpec, IngressTls};
pub use object::{ObjectKey, ObjectMeta, ResourceKind};
pub use secret::{Secret, SECRET_TYPE_TLS, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY};
