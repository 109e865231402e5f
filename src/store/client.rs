//! Core store traits and watch types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::error::StoreResult;
use crate::domain::{Ingress, ObjectKey, ObjectMeta, ResourceKind, Secret};

/// An equality-based label query. All pairs must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Create an empty selector (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality requirement.
    pub fn equals(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), value.into());
        self
    }

    /// Whether a label set satisfies every requirement.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|(key, value)| labels.get(key) == Some(value))
    }

    /// The equality requirements, for rendering the query.
    pub fn requirements(&self) -> &BTreeMap<String, String> {
        &self.requirements
    }
}

/// The classes of watch notification a subscriber can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// A new object appeared.
    Added,
    /// An existing object changed.
    Modified,
    /// An object was removed.
    Deleted,
    /// A periodic re-list redelivered the object without a change.
    Resync,
}

/// A watch notification carrying only the object's identity. Handlers
/// re-fetch current state from the store's read path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub event_type: EventType,
    pub key: ObjectKey,
}

impl WatchEvent {
    pub fn new(event_type: EventType, key: ObjectKey) -> Self {
        Self { event_type, key }
    }
}

/// Read and write access to the resource store.
///
/// Implementations signal NotFound, AlreadyExists, and Conflict as distinct
/// outcomes so callers can treat them as benign; any other failure is
/// transient and retryable at the caller's granularity.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an Ingress by identity.
    async fn get_ingress(&self, key: &ObjectKey) -> StoreResult<Ingress>;

    /// Fetch a Secret by identity.
    async fn get_secret(&self, key: &ObjectKey) -> StoreResult<Secret>;

    /// List metadata of all Secrets matching a label selector. Discovery
    /// needs identities and labels only, never payloads.
    async fn list_secrets(&self, selector: &LabelSelector) -> StoreResult<Vec<ObjectMeta>>;

    /// Create a Secret. Fails with AlreadyExists when the identity is taken.
    async fn create_secret(&self, secret: &Secret) -> StoreResult<Secret>;

    /// Update an existing Secret. Fails with NotFound when the identity is
    /// gone and with Conflict when the carried resource version is stale.
    async fn update_secret(&self, secret: &Secret) -> StoreResult<Secret>;

    /// Whether a Secret exists at the given identity.
    async fn secret_exists(&self, key: &ObjectKey) -> StoreResult<bool> {
        match self.get_secret(key).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Watch feed access, one broadcast channel per resource kind.
pub trait EventSource: Send + Sync {
    /// Subscribe to watch events for a resource kind. Slow subscribers may
    /// observe lag; the identity-only payload makes redelivery harmless.
    fn subscribe(&self, kind: ResourceKind) -> broadcast::Receiver<WatchEvent>;
}
