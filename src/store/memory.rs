//! In-process store backend.
//!
//! Development and test grade: objects live in maps guarded by async locks,
//! resource versions are assigned on create and incremented on update, and
//! every mutation is published on the watch channels. Production deployments
//! bind [`ObjectStore`] and [`EventSource`] to the real resource store; this
//! backend exists so the whole controller can run and be exercised without
//! one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::client::{EventSource, EventType, LabelSelector, ObjectStore, WatchEvent};
use super::error::{StoreError, StoreResult};
use crate::domain::{Ingress, ObjectKey, ObjectMeta, ResourceKind, Secret};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Snapshot of how many trait-surface operations the store has served.
/// Tests assert on these to prove an operation touched (or left alone)
/// specific parts of the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub ingress_gets: u64,
    pub secret_gets: u64,
    pub secret_lists: u64,
    pub secret_creates: u64,
    pub secret_updates: u64,
}

#[derive(Default)]
struct Counters {
    ingress_gets: AtomicU64,
    secret_gets: AtomicU64,
    secret_lists: AtomicU64,
    secret_creates: AtomicU64,
    secret_updates: AtomicU64,
}

struct Inner {
    ingresses: RwLock<HashMap<ObjectKey, Ingress>>,
    secrets: RwLock<HashMap<ObjectKey, Secret>>,
    ingress_events: broadcast::Sender<WatchEvent>,
    secret_events: broadcast::Sender<WatchEvent>,
    counters: Counters,
}

/// In-memory [`ObjectStore`] + [`EventSource`] backend.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (ingress_events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (secret_events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                ingresses: RwLock::new(HashMap::new()),
                secrets: RwLock::new(HashMap::new()),
                ingress_events,
                secret_events,
                counters: Counters::default(),
            }),
        }
    }

    /// Insert or replace an Ingress, publishing the matching watch event.
    pub async fn upsert_ingress(&self, ingress: Ingress) {
        let key = ingress.key();
        let event_type = {
            let mut ingresses = self.inner.ingresses.write().await;
            let replaced = ingresses.insert(key.clone(), ingress).is_some();
            if replaced {
                EventType::Modified
            } else {
                EventType::Added
            }
        };
        self.publish(ResourceKind::Ingress, WatchEvent::new(event_type, key));
    }

    /// Insert or replace a Secret, assigning the next resource version and
    /// publishing the matching watch event. Returns the stored object.
    pub async fn upsert_secret(&self, secret: Secret) -> Secret {
        let key = secret.key();
        let (stored, event_type) = {
            let mut secrets = self.inner.secrets.write().await;
            let mut stored = secret;
            let event_type = match secrets.get(&key) {
                Some(existing) => {
                    stored.metadata.resource_version = existing.metadata.resource_version + 1;
                    EventType::Modified
                }
                None => {
                    stored.metadata.resource_version = 1;
                    EventType::Added
                }
            };
            secrets.insert(key.clone(), stored.clone());
            (stored, event_type)
        };
        self.publish(ResourceKind::Secret, WatchEvent::new(event_type, key));
        stored
    }

    /// Remove a Secret, publishing a Deleted event when it existed.
    pub async fn delete_secret(&self, key: &ObjectKey) -> bool {
        let removed = self.inner.secrets.write().await.remove(key).is_some();
        if removed {
            self.publish(ResourceKind::Secret, WatchEvent::new(EventType::Deleted, key.clone()));
        }
        removed
    }

    /// Redeliver every stored identity of a kind as a Resync event, the way
    /// a periodic re-list would.
    pub async fn resync(&self, kind: ResourceKind) {
        let keys: Vec<ObjectKey> = match kind {
            ResourceKind::Ingress => {
                self.inner.ingresses.read().await.keys().cloned().collect()
            }
            ResourceKind::Secret => self.inner.secrets.read().await.keys().cloned().collect(),
        };
        for key in keys {
            self.publish(kind, WatchEvent::new(EventType::Resync, key));
        }
    }

    /// Snapshot of the operation counters.
    pub fn op_counts(&self) -> OpCounts {
        let counters = &self.inner.counters;
        OpCounts {
            ingress_gets: counters.ingress_gets.load(Ordering::Relaxed),
            secret_gets: counters.secret_gets.load(Ordering::Relaxed),
            secret_lists: counters.secret_lists.load(Ordering::Relaxed),
            secret_creates: counters.secret_creates.load(Ordering::Relaxed),
            secret_updates: counters.secret_updates.load(Ordering::Relaxed),
        }
    }

    fn publish(&self, kind: ResourceKind, event: WatchEvent) {
        let sender = match kind {
            ResourceKind::Ingress => &self.inner.ingress_events,
            ResourceKind::Secret => &self.inner.secret_events,
        };
        // Send only fails when nobody is subscribed, which is fine.
        let _ = sender.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_ingress(&self, key: &ObjectKey) -> StoreResult<Ingress> {
        self.inner.counters.ingress_gets.fetch_add(1, Ordering::Relaxed);
        self.inner
            .ingresses
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ResourceKind::Ingress, key.clone()))
    }

    async fn get_secret(&self, key: &ObjectKey) -> StoreResult<Secret> {
        self.inner.counters.secret_gets.fetch_add(1, Ordering::Relaxed);
        self.inner
            .secrets
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ResourceKind::Secret, key.clone()))
    }

    async fn list_secrets(&self, selector: &LabelSelector) -> StoreResult<Vec<ObjectMeta>> {
        self.inner.counters.secret_lists.fetch_add(1, Ordering::Relaxed);
        let secrets = self.inner.secrets.read().await;
        let mut items: Vec<ObjectMeta> = secrets
            .values()
            .filter(|secret| selector.matches(&secret.metadata.labels))
            .map(|secret| secret.metadata.clone())
            .collect();
        items.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(items)
    }

    async fn create_secret(&self, secret: &Secret) -> StoreResult<Secret> {
        self.inner.counters.secret_creates.fetch_add(1, Ordering::Relaxed);
        let key = secret.key();
        let stored = {
            let mut secrets = self.inner.secrets.write().await;
            if secrets.contains_key(&key) {
                return Err(StoreError::already_exists(ResourceKind::Secret, key));
            }
            let mut stored = secret.clone();
            stored.metadata.resource_version = 1;
            secrets.insert(key.clone(), stored.clone());
            stored
        };
        self.publish(ResourceKind::Secret, WatchEvent::new(EventType::Added, key));
        Ok(stored)
    }

    async fn update_secret(&self, secret: &Secret) -> StoreResult<Secret> {
        self.inner.counters.secret_updates.fetch_add(1, Ordering::Relaxed);
        let key = secret.key();
        let stored = {
            let mut secrets = self.inner.secrets.write().await;
            let existing = secrets
                .get(&key)
                .ok_or_else(|| StoreError::not_found(ResourceKind::Secret, key.clone()))?;
            if secret.metadata.resource_version != existing.metadata.resource_version {
                return Err(StoreError::conflict(ResourceKind::Secret, key));
            }
            let mut stored = secret.clone();
            stored.metadata.resource_version = existing.metadata.resource_version + 1;
            secrets.insert(key.clone(), stored.clone());
            stored
        };
        self.publish(ResourceKind::Secret, WatchEvent::new(EventType::Modified, key));
        Ok(stored)
    }
}

impl EventSource for MemoryStore {
    fn subscribe(&self, kind: ResourceKind) -> broadcast::Receiver<WatchEvent> {
        match kind {
            ResourceKind::Ingress => self.inner.ingress_events.subscribe(),
            ResourceKind::Secret => self.inner.secret_events.subscribe(),
        }
    }
}
