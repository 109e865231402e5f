//! Error types for resource store operations.

use thiserror::Error;

use crate::domain::{ObjectKey, ResourceKind};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// The first three variants are distinct, benign outcomes the calling code
/// branches on; everything else is a transient backend failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("{kind} [{key}] not found")]
    NotFound { kind: ResourceKind, key: ObjectKey },

    /// A create collided with an object that already exists.
    #[error("{kind} [{key}] already exists")]
    AlreadyExists { kind: ResourceKind, key: ObjectKey },

    /// An update carried a stale resource version.
    #[error("{kind} [{key}] was modified concurrently")]
    Conflict { kind: ResourceKind, key: ObjectKey },

    /// Backend-specific failure.
    #[error("Store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Create a not found error.
    pub fn not_found(kind: ResourceKind, key: ObjectKey) -> Self {
        Self::NotFound { kind, key }
    }

    /// Create an already exists error.
    pub fn already_exists(kind: ResourceKind, key: ObjectKey) -> Self {
        Self::AlreadyExists { kind, key }
    }

    /// Create a conflict error.
    pub fn conflict(kind: ResourceKind, key: ObjectKey) -> Self {
        Self::Conflict { kind, key }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    /// Whether this is the benign "does not exist" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is the benign create-race outcome.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Whether this is the benign lost-update outcome.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let key = ObjectKey::new("target", "tls-example-io");

        let err = StoreError::not_found(ResourceKind::Secret, key.clone());
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
        assert_eq!(err.to_string(), "Secret [target/tls-example-io] not found");

        let err = StoreError::already_exists(ResourceKind::Secret, key.clone());
        assert!(err.is_already_exists());

        let err = StoreError::conflict(ResourceKind::Secret, key);
        assert!(err.is_conflict());

        let err = StoreError::backend("connection reset");
        assert!(!err.is_not_found() && !err.is_already_exists() && !err.is_conflict());
    }
}
