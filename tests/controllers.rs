//! Integration tests for the watch-driven controllers.
//!
//! These run real controllers against the in-memory store and assert on
//! what eventually lands in it: source updates fanning out to replicas,
//! Ingress catch-up creating missed replicas, and the paths that must
//! leave the store untouched.

mod common;

use std::sync::Arc;
use std::time::Duration;

use certsync::config::ControllerConfig;
use certsync::controller::{Controller, IngressReconciler, SecretReconciler};
use certsync::domain::{ObjectKey, ResourceKind, Secret};
use certsync::replication::{replica_selector, SecretReplicator};
use certsync::store::{EventSource, MemoryStore, ObjectStore};

use tokio::sync::watch;
use tokio::time::{sleep, Instant};

use common::{example_ingress, tls_secret};

fn fast_backoff() -> ControllerConfig {
    ControllerConfig { initial_backoff_ms: 1, max_backoff_ms: 10 }
}

/// Poll every 10ms until `deadline` for the store to reach the expected
/// state, then panic with `what` if it never does.
macro_rules! eventually {
    ($what:expr, $check:expr) => {{
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if $check {
                break;
            }
            if Instant::now() > deadline {
                panic!("timed out waiting for {}", $what);
            }
            sleep(Duration::from_millis(10)).await;
        }
    }};
}

#[tokio::test]
async fn test_source_update_fans_out_to_all_replicas() {
    let store = Arc::new(MemoryStore::new());
    let replicator = SecretReplicator::new(store.clone(), "source");

    store.upsert_secret(tls_secret("source")).await;
    replicator.ensure_replicas(&example_ingress("target-a")).await;
    replicator.ensure_replicas(&example_ingress("target-b")).await;
    assert_eq!(store.op_counts().secret_creates, 2);

    let controller = Controller::new(
        SecretReconciler::new(store.clone(), "source"),
        store.subscribe(ResourceKind::Secret),
        &fast_backoff(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(controller.run(shutdown_rx));

    // Rotate the source credential.
    let mut rotated = store.get_secret(&ObjectKey::new("source", "tls-example-io")).await.unwrap();
    rotated.data.insert("tls.crt".to_string(), b"certificate2".to_vec());
    rotated.data.insert("tls.key".to_string(), b"private key2".to_vec());
    store.upsert_secret(rotated.clone()).await;

    for namespace in ["target-a", "target-b"] {
        let key = ObjectKey::new(namespace, "tls-example-io");
        eventually!(
            format!("replica {key} to pick up the rotated data"),
            store.get_secret(&key).await.unwrap().data == rotated.data
        );

        let replica = store.get_secret(&key).await.unwrap();
        assert_eq!(replica.metadata.resource_version, 2);
        // The refresh keeps the provenance labels discovery relies on.
        assert!(replica_selector("tls-example-io").matches(&replica.metadata.labels));
    }

    // The refresh path updates existing replicas, it never creates new ones.
    assert_eq!(store.op_counts().secret_creates, 2);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().expect("controller shut down cleanly");
}

#[tokio::test]
async fn test_ingress_event_heals_missing_replica() {
    let store = Arc::new(MemoryStore::new());
    store.upsert_secret(tls_secret("source")).await;

    let controller = Controller::new(
        IngressReconciler::new(store.clone(), SecretReplicator::new(store.clone(), "source")),
        store.subscribe(ResourceKind::Ingress),
        &fast_backoff(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(controller.run(shutdown_rx));

    // The Ingress lands without the webhook having created its replica.
    store.upsert_ingress(example_ingress("target")).await;

    let key = ObjectKey::new("target", "tls-example-io");
    eventually!("the replica to be created", store.get_secret(&key).await.is_ok());

    let replica = store.get_secret(&key).await.unwrap();
    assert_eq!(replica.data, tls_secret("source").data);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().expect("controller shut down cleanly");
}

#[tokio::test]
async fn test_source_namespace_ingress_is_skipped() {
    let store = Arc::new(MemoryStore::new());
    store.upsert_secret(tls_secret("source")).await;

    let controller = Controller::new(
        IngressReconciler::new(store.clone(), SecretReplicator::new(store.clone(), "source")),
        store.subscribe(ResourceKind::Ingress),
        &fast_backoff(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(controller.run(shutdown_rx));

    // A same-namespace Ingress followed by one the controller must serve.
    store.upsert_ingress(example_ingress("source")).await;
    store.upsert_ingress(example_ingress("target")).await;

    eventually!(
        "the target replica to be created",
        store.get_secret(&ObjectKey::new("target", "tls-example-io")).await.is_ok()
    );

    // Only the target Ingress was fetched; the source one was skipped
    // before touching the store.
    assert_eq!(store.op_counts().ingress_gets, 1);
    assert!(store.get_secret(&ObjectKey::new("source", "tls-example-io")).await.is_ok());

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().expect("controller shut down cleanly");
}

#[tokio::test]
async fn test_non_tls_source_secret_is_ignored() {
    let store = Arc::new(MemoryStore::new());

    let controller = Controller::new(
        SecretReconciler::new(store.clone(), "source"),
        store.subscribe(ResourceKind::Secret),
        &fast_backoff(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(controller.run(shutdown_rx));

    let opaque = Secret::new(
        "source",
        "api-token",
        "Opaque",
        std::collections::BTreeMap::from([("token".to_string(), b"t0k3n".to_vec())]),
    );
    store.upsert_secret(opaque).await;

    eventually!("the reconciler to fetch the Secret", store.op_counts().secret_gets >= 1);
    assert_eq!(store.op_counts().secret_lists, 0);
    assert_eq!(store.op_counts().secret_updates, 0);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().expect("controller shut down cleanly");
}

#[tokio::test]
async fn test_late_source_secret_is_not_backfilled_by_the_secret_controller() {
    let store = Arc::new(MemoryStore::new());
    let replicator = SecretReplicator::new(store.clone(), "source");

    // The declaration is processed while the source secret does not exist
    // yet, so no replica comes out of it.
    store.upsert_ingress(example_ingress("target")).await;
    let created = replicator.ensure_replicas(&example_ingress("target")).await;
    assert!(created.is_empty());

    let secret_controller = Controller::new(
        SecretReconciler::new(store.clone(), "source"),
        store.subscribe(ResourceKind::Secret),
        &fast_backoff(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let secret_handle = tokio::spawn(secret_controller.run(shutdown_rx.clone()));

    // The source secret arrives afterwards. The Secret controller only
    // refreshes replicas discovered by label, and none exist, so the gap
    // stays open.
    store.upsert_secret(tls_secret("source")).await;

    let replica_key = ObjectKey::new("target", "tls-example-io");
    eventually!("the source secret to be reconciled", store.op_counts().secret_lists >= 1);
    assert!(store.get_secret(&replica_key).await.is_err());

    // Only the Ingress controller's own trigger closes it.
    let ingress_controller = Controller::new(
        IngressReconciler::new(store.clone(), replicator),
        store.subscribe(ResourceKind::Ingress),
        &fast_backoff(),
    );
    let ingress_handle = tokio::spawn(ingress_controller.run(shutdown_rx));
    store.upsert_ingress(example_ingress("target")).await;

    eventually!("the replica to be created", store.get_secret(&replica_key).await.is_ok());

    shutdown_tx.send(true).unwrap();
    secret_handle.await.unwrap().expect("secret controller shut down cleanly");
    ingress_handle.await.unwrap().expect("ingress controller shut down cleanly");
}
