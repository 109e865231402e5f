//! # Certsync
//!
//! Certsync replicates TLS Secrets from a single source namespace into every
//! namespace whose Ingresses reference them, so certificates issued in one
//! place can terminate TLS everywhere.
//!
//! ## Architecture
//!
//! Two paths keep replicas in step with their source:
//!
//! ```text
//! Admission Webhook → Replication Engine → Object Store
//!                            ↑
//! Watch Events → Controllers ┘
//! ```
//!
//! ## Core Components
//!
//! - **Admission Webhook**: Axum-based HTTPS server that reviews Ingress
//!   mutations and creates missing replicas before the Ingress lands
//! - **Controllers**: Watch-driven reconcilers that catch up Ingresses the
//!   webhook missed and fan out source Secret updates to their replicas
//! - **Replication Engine**: Creates labeled replica Secrets in target
//!   namespaces and skips everything it does not own
//! - **Object Store**: Cluster state access behind a trait, with an
//!   in-memory implementation for tests and local runs

pub mod admission;
pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod replication;
pub mod store;
pub mod utils;

// Re-export commonly used types and traits
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
