//! # Error Handling
//!
//! Crate-wide error types for the certsync controller, built on `thiserror`.
//! Store-level outcomes (not found, already exists, conflict) live in
//! [`crate::store::StoreError`]; this module covers process-level failures.

mod tls;

pub use tls::TlsError;

/// Custom result type for certsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the certsync controller
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors (admission listener, ops endpoints)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Certificate loading and validation errors
    #[error(transparent)]
    Tls(#[from] TlsError),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::Config(format!("Validation failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let error = Error::config("missing source namespace");
        assert!(matches!(error, Error::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: missing source namespace");

        let error = Error::transport("bind failed");
        assert!(matches!(error, Error::Transport(_)));
    }

    #[test]
    fn test_tls_conversion() {
        let tls_error = TlsError::EmptyCertificateChain { path: "/certs/tls.crt".into() };
        let error: Error = tls_error.into();
        assert!(matches!(error, Error::Tls(_)));
    }
}
