//! Keyed runner for user-initiated actions.
//!
//! Every action runs as a tokio task registered under an [`ActionKey`].
//! Submitting a key that is already in flight joins the running task
//! instead of starting a second one, and tasks can be cancelled one key at
//! a time or for a whole UI scope when that context is discarded.

use facelink_core::{Action, Outcome};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// Identity of a request: which screen started it, what it does, and on whom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub scope: String,
    pub action: Action,
    pub subject: Option<String>,
}

impl ActionKey {
    pub fn new(scope: impl Into<String>, action: Action) -> Self {
        Self {
            scope: scope.into(),
            action,
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

struct InFlight {
    id: u64,
    abort: AbortHandle,
    result: watch::Receiver<Option<Outcome>>,
}

type InFlightTable = HashMap<ActionKey, InFlight>;

/// Clone-safe handle to the table of running actions.
#[derive(Clone, Default)]
pub struct ActionRunner {
    in_flight: Arc<Mutex<InFlightTable>>,
    next_id: Arc<AtomicU64>,
}

/// Waits for one submitted action.
pub struct ActionHandle {
    key: ActionKey,
    joined: bool,
    result: watch::Receiver<Option<Outcome>>,
}

impl ActionHandle {
    pub fn key(&self) -> &ActionKey {
        &self.key
    }

    /// True if this handle attached to a task that was already running.
    pub fn joined_existing(&self) -> bool {
        self.joined
    }

    /// The action's outcome, or `None` if it was cancelled.
    pub async fn outcome(mut self) -> Option<Outcome> {
        let outcome = match self.result.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };
        outcome
    }
}

impl ActionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` under `key`, or join the task already running under it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F>(&self, key: ActionKey, action: F) -> ActionHandle
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let mut table = self.lock();

        if let Some(existing) = table.get(&key) {
            let settled = existing.result.borrow().is_some();
            if !settled && !existing.abort.is_finished() {
                tracing::debug!(?key, "joining in-flight action");
                return ActionHandle {
                    key,
                    joined: true,
                    result: existing.result.clone(),
                };
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(None);
        let registry = Arc::clone(&self.in_flight);
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            let outcome = action.await;
            tracing::debug!(key = ?task_key, success = outcome.success, "action finished");
            {
                let mut table = registry.lock().unwrap_or_else(PoisonError::into_inner);
                if table.get(&task_key).is_some_and(|entry| entry.id == id) {
                    table.remove(&task_key);
                }
            }
            let _ = tx.send(Some(outcome));
        });

        tracing::debug!(?key, id, "action started");
        table.insert(
            key.clone(),
            InFlight {
                id,
                abort: task.abort_handle(),
                result: rx.clone(),
            },
        );

        ActionHandle {
            key,
            joined: false,
            result: rx,
        }
    }

    /// Cancel the action running under `key`. Returns whether one was running.
    pub fn cancel(&self, key: &ActionKey) -> bool {
        match self.lock().remove(key) {
            Some(entry) => {
                entry.abort.abort();
                tracing::info!(?key, "action cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every action started from `scope`. Returns how many were stopped.
    pub fn cancel_scope(&self, scope: &str) -> usize {
        let mut table = self.lock();
        let keys: Vec<ActionKey> = table.keys().filter(|k| k.scope == scope).cloned().collect();
        for key in &keys {
            if let Some(entry) = table.remove(key) {
                entry.abort.abort();
            }
        }
        if !keys.is_empty() {
            tracing::info!(scope, count = keys.len(), "scope cancelled");
        }
        keys.len()
    }

    /// Number of actions currently registered.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, InFlightTable> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
