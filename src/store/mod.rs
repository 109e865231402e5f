//! Resource store abstraction.
//!
//! The store is an external collaborator: an object store keyed by
//! (namespace, name, kind) with optimistic concurrency and a watch feed.
//! Everything certsync needs from it is expressed by the [`ObjectStore`] and
//! [`EventSource`] traits; [`MemoryStore`] is the bundled in-process backend
//! used for development and tests.

pub mod client;
pub mod error;
pub mod memory;

pub use client::{EventSource, EventType, LabelSelector, ObjectStore, WatchEvent};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, OpCounts};
