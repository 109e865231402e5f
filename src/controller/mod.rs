//! Watch-driven reconciliation.
//!
//! The runner drains watch events into sequential reconciles; the two
//! reconcilers cover the catch-up path for Ingress declarations and the
//! fan-out path for changed source secrets.

pub mod ingress;
pub mod runner;
pub mod secret;

pub use ingress::IngressReconciler;
pub use runner::{Controller, ReconcileError, Reconciler};
pub use secret::SecretReconciler;
