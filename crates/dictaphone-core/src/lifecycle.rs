//! Lifecycle plumbing for async operations observed by a UI.
//!
//! [`AsyncOp`] runs a retryable async operation and publishes its
//! loading / error / value state through a watch channel. Concurrent
//! runs are resolved by initiation order: each run takes a sequence
//! number and only the completion matching the latest number is
//! applied, so a slow early run can never overwrite a fresh one.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
};

use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::{CoreError, CoreResult};

/// Observable state of an [`AsyncOp`].
///
/// While a run is in flight the previous value and error are both kept,
/// so observers can keep rendering stale data instead of flashing back
/// to a blank loading screen.
pub enum OpState<T> {
    /// A run is in flight. Carries whatever the previous run produced.
    Pending {
        /// Value from the last successful run, if any.
        value: Option<Arc<T>>,
        /// Error from the last failed run, if any.
        error: Option<Arc<CoreError>>,
    },
    /// The latest run succeeded.
    Ready {
        /// The produced value.
        value: Arc<T>,
    },
    /// The latest run failed.
    Failed {
        /// The produced error.
        error: Arc<CoreError>,
    },
}

impl<T> OpState<T> {
    /// Whether a run is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, OpState::Pending { .. })
    }

    /// The current value: the settled result, or the stale one while a
    /// re-run is in flight. A settled failure holds no value.
    pub fn value(&self) -> Option<&T> {
        match self {
            OpState::Pending { value, .. } => value.as_deref(),
            OpState::Ready { value } => Some(value),
            OpState::Failed { .. } => None,
        }
    }

    /// The most recent error, unless a success has cleared it.
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            OpState::Pending { error, .. } => error.as_deref(),
            OpState::Ready { .. } => None,
            OpState::Failed { error, .. } => Some(error),
        }
    }

    fn reloading(&self) -> Self {
        match self {
            OpState::Pending { value, error } => OpState::Pending {
                value: value.clone(),
                error: error.clone(),
            },
            OpState::Ready { value } => OpState::Pending {
                value: Some(Arc::clone(value)),
                error: None,
            },
            OpState::Failed { error } => OpState::Pending {
                value: None,
                error: Some(Arc::clone(error)),
            },
        }
    }

}

impl<T> Clone for OpState<T> {
    fn clone(&self) -> Self {
        match self {
            OpState::Pending { value, error } => OpState::Pending {
                value: value.clone(),
                error: error.clone(),
            },
            OpState::Ready { value } => OpState::Ready {
                value: Arc::clone(value),
            },
            OpState::Failed { error } => OpState::Failed {
                error: Arc::clone(error),
            },
        }
    }
}

type OpFuture<T> = BoxFuture<'static, CoreResult<T>>;

/// A retryable async operation with observable lifecycle state.
///
/// Starts out loading; call [`run`](Self::run) to begin the first
/// execution. Dropping the handle detaches it, after which in-flight
/// completions are discarded rather than applied.
pub struct AsyncOp<T> {
    op: Arc<dyn Fn() -> OpFuture<T> + Send + Sync>,
    state_tx: watch::Sender<OpState<T>>,
    seq: Arc<AtomicU64>,
    alive: Arc<AtomicBool>,
    attempts: Arc<AtomicU32>,
}

impl<T: Send + Sync + 'static> AsyncOp<T> {
    /// Wrap `op` without running it yet.
    pub fn new<F>(op: F) -> Self
    where
        F: Fn() -> OpFuture<T> + Send + Sync + 'static,
    {
        let (state_tx, _) = watch::channel(OpState::Pending {
            value: None,
            error: None,
        });

        Self {
            op: Arc::new(op),
            state_tx,
            seq: Arc::new(AtomicU64::new(0)),
            alive: Arc::new(AtomicBool::new(true)),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Watch the lifecycle state.
    pub fn subscribe(&self) -> watch::Receiver<OpState<T>> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current lifecycle state.
    pub fn state(&self) -> OpState<T> {
        self.state_tx.borrow().clone()
    }

    /// Number of retries requested so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Start a run, superseding any run still in flight.
    ///
    /// Must be called within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn run(&self) {
        if !self.alive.load(Ordering::Acquire) {
            debug!("Run ignored after detach");
            return;
        }

        let call_id = self.seq.fetch_add(1, Ordering::AcqRel) + 1;
        self.state_tx.send_modify(|state| *state = state.reloading());

        let future = (self.op)();
        let state_tx = self.state_tx.clone();
        let seq = Arc::clone(&self.seq);
        let alive = Arc::clone(&self.alive);

        tokio::spawn(async move {
            let result = future.await;

            // The checks live inside the send closure so a newer run
            // cannot start between the check and the write.
            let applied = state_tx.send_if_modified(|state| {
                if !alive.load(Ordering::Acquire) {
                    return false;
                }
                if seq.load(Ordering::Acquire) != call_id {
                    return false;
                }
                *state = match result {
                    Ok(value) => OpState::Ready {
                        value: Arc::new(value),
                    },
                    Err(error) => OpState::Failed {
                        error: Arc::new(error),
                    },
                };
                true
            });

            if !applied {
                debug!(call_id, "Discarded stale completion");
            }
        });
    }

    /// Re-run after a completed attempt. Ignored while a run is still
    /// in flight.
    #[instrument(skip(self))]
    pub fn retry(&self) {
        if self.state_tx.borrow().is_loading() {
            debug!("Retry ignored while loading");
            return;
        }

        self.attempts.fetch_add(1, Ordering::AcqRel);
        self.run();
    }

    /// Stop applying results. In-flight completions are discarded.
    pub fn detach(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl<T> Drop for AsyncOp<T> {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
