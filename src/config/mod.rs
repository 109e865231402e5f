//! Configuration management.
//!
//! Settings come from environment variables with the `CERTSYNC_` prefix,
//! overridden where applicable by command line flags. Validation runs once
//! at startup, before any listener binds.

mod settings;
mod tls;

pub use settings::{
    AdmissionConfig, AppConfig, ControllerConfig, HealthConfig, LeaseConfig, ObservabilityConfig,
    ReplicationConfig,
};
pub use tls::AdmissionTlsConfig;
