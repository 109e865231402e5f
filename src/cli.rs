//! Command line interface for the certsync controller.
//!
//! Flags override whatever the environment-derived configuration produced,
//! so deployments can pin the essentials on the command line and leave the
//! rest to `CERTSYNC_*` variables.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "certsync")]
#[command(about = "Replicates TLS Secrets into the namespaces whose Ingresses reference them")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Namespace holding the source Secrets
    #[arg(long)]
    pub source_namespace: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding the webhook serving certificate (tls.crt and tls.key)
    #[arg(long)]
    pub cert_dir: Option<PathBuf>,

    /// Leader election lease name
    #[arg(long)]
    pub lease_name: Option<String>,

    /// Namespace holding the leader election lease
    #[arg(long)]
    pub lease_namespace: Option<String>,
}

impl Cli {
    /// Fold command line overrides into the configuration.
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(source_namespace) = self.source_namespace {
            config.replication.source_namespace = source_namespace;
        }
        if let Some(log_level) = self.log_level {
            config.observability.log_level = log_level;
        }
        if let Some(cert_dir) = self.cert_dir {
            config.admission.tls.cert_dir = cert_dir;
        }
        if let Some(lease_name) = self.lease_name {
            config.lease.name = lease_name;
        }
        if let Some(lease_namespace) = self.lease_namespace {
            config.lease.namespace = lease_namespace;
        }
    }
}
