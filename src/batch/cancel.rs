// src/batch/cancel.rs

//! Cooperative cancellation for workers.
//!
//! Workers check the token once per loop iteration, between invocations; an
//! in-flight external command is never preempted, because killing an
//! external tool mid-invocation risks leaving target state partially
//! mutated.

use tokio::sync::watch;

/// Create a connected handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Requests cancellation; held by the orchestrator's caller (e.g. the
/// Ctrl-C task).
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // All tokens may already be dropped; that's fine.
        let _ = self.tx.send(true);
    }
}

/// Cheap clonable token observed by every worker.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}
