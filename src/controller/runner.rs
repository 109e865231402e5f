//! Watch-driven controller runner.
//!
//! One runner owns one subscription and one reconciler. Events are
//! filtered by class, deduplicated while queued, and reconciled
//! sequentially; a failed reconcile is requeued with exponential backoff.
//! An event arriving for a key that is already waiting in the queue is
//! dropped, because the pending run will observe the newer state anyway.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::domain::{ObjectKey, ResourceKind};
use crate::store::{EventType, WatchEvent};

/// Failure of a single reconcile attempt. Every error is retried with
/// backoff; conditions that should not be retried are handled inside the
/// reconcilers and reported as success.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ReconcileError {
    message: String,
}

impl ReconcileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// One reconcile target kind and its logic.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// The kind of object this reconciler handles.
    fn kind(&self) -> ResourceKind;

    /// Bring the object identified by `key` back in line with desired state.
    async fn reconcile(&self, key: &ObjectKey) -> Result<(), ReconcileError>;
}

struct Retry {
    key: ObjectKey,
    at: Instant,
}

pub struct Controller<R> {
    reconciler: R,
    events: broadcast::Receiver<WatchEvent>,
    initial_backoff: Duration,
    max_backoff: Duration,
    kind: ResourceKind,
    queue: VecDeque<ObjectKey>,
    queued: HashSet<ObjectKey>,
    retries: Vec<Retry>,
    attempts: HashMap<ObjectKey, u32>,
}

impl<R: Reconciler> Controller<R> {
    pub fn new(
        reconciler: R,
        events: broadcast::Receiver<WatchEvent>,
        config: &ControllerConfig,
    ) -> Self {
        let kind = reconciler.kind();
        Self {
            reconciler,
            events,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
            kind,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            retries: Vec::new(),
            attempts: HashMap::new(),
        }
    }

    /// Consume events and reconcile until the shutdown signal fires or the
    /// event channel closes. The in-flight reconcile always completes
    /// before the runner stops.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> crate::Result<()> {
        info!(kind = %self.kind, "Starting controller");
        loop {
            self.promote_due_retries();
            if self.reconcile_next().await {
                continue;
            }

            let next_retry = self.next_retry_deadline();
            tokio::select! {
                _ = shutdown.changed() => break,
                event = self.events.recv() => match event {
                    Ok(event) => self.observe(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(kind = %self.kind, skipped, "Watch events lagged, some updates were dropped");
                        crate::observability::metrics::record_watch_lagged(&self.kind.to_string())
                            .await;
                    }
                    Err(RecvError::Closed) => {
                        info!(kind = %self.kind, "Watch channel closed, stopping controller");
                        return Ok(());
                    }
                },
                _ = sleep_until(next_retry.unwrap_or_else(Instant::now)), if next_retry.is_some() => {}
            }
        }
        info!(kind = %self.kind, "Controller shutdown completed");
        Ok(())
    }

    /// Apply event-class filtering and queue the key for reconciliation.
    fn observe(&mut self, event: WatchEvent) {
        match event.event_type {
            EventType::Deleted => {
                debug!(
                    "Skipping reconciliation of {} [{}] as it has been deleted",
                    self.kind, event.key
                );
            }
            EventType::Resync => {
                debug!(
                    "Skipping reconciliation of {} [{}] for the resync event type",
                    self.kind, event.key
                );
            }
            EventType::Added | EventType::Modified => self.enqueue(event.key),
        }
    }

    fn enqueue(&mut self, key: ObjectKey) {
        if self.queued.insert(key.clone()) {
            self.queue.push_back(key);
        }
    }

    /// Reconcile the next queued key, if any. Returns whether work was done.
    async fn reconcile_next(&mut self) -> bool {
        let Some(key) = self.queue.pop_front() else {
            return false;
        };
        self.queued.remove(&key);

        let kind_label = self.kind.to_string();
        match self.reconciler.reconcile(&key).await {
            Ok(()) => {
                self.attempts.remove(&key);
                crate::observability::metrics::record_reconciliation(&kind_label, "success").await;
            }
            Err(err) => {
                let attempt = self.attempts.entry(key.clone()).or_insert(0);
                *attempt += 1;
                let delay = backoff_delay(self.initial_backoff, self.max_backoff, *attempt);
                warn!(
                    kind = %self.kind,
                    key = %key,
                    attempt = *attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Reconciliation failed, scheduling retry"
                );
                crate::observability::metrics::record_reconciliation(&kind_label, "retry").await;
                self.retries.push(Retry { key, at: Instant::now() + delay });
            }
        }
        true
    }

    fn promote_due_retries(&mut self) {
        let now = Instant::now();
        let mut due = Vec::new();
        self.retries.retain(|retry| {
            if retry.at <= now {
                due.push(retry.key.clone());
                false
            } else {
                true
            }
        });
        for key in due {
            self.enqueue(key);
        }
    }

    fn next_retry_deadline(&self) -> Option<Instant> {
        self.retries.iter().map(|retry| retry.at).min()
    }
}

fn backoff_delay(initial: Duration, max: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    initial.saturating_mul(2u32.saturating_pow(exponent)).min(max)
}
