//! Shutdown coordination.
//!
//! All termination state lives on one [`Lifecycle`] object owned by
//! [`AppState`](crate::state::AppState); handlers and retry loops consult it
//! instead of ambient process state. [`Lifecycle::request_exit`] only makes
//! the decision; the caller in `main` performs the disconnect and the
//! process exit, which keeps the idempotence and transport-failure rules
//! unit-testable.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use tokio::sync::watch;

/// What the caller of [`Lifecycle::request_exit`] should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    /// Disconnect from the gateway, then exit with `code`.
    Graceful { code: i32 },
    /// The transport is unusable; exit with `code` without disconnecting.
    Immediate { code: i32 },
    /// A shutdown is already in progress; log a notice and do nothing.
    AlreadyExiting,
}

#[derive(Debug)]
pub struct Lifecycle {
    shutting_down: AtomicBool,
    transport_failed: AtomicBool,
    exit_code: AtomicI32,
    shutdown_tx: watch::Sender<bool>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutting_down: AtomicBool::new(false),
            transport_failed: AtomicBool::new(false),
            exit_code: AtomicI32::new(0),
            shutdown_tx,
        }
    }

    /// Receiver that resolves once shutdown has been requested. Retry loops
    /// hold one and give up when it fires.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Record a fatal transport failure. Returns true only on the first call.
    pub fn mark_transport_failed(&self) -> bool {
        !self.transport_failed.swap(true, Ordering::SeqCst)
    }

    pub fn transport_failed(&self) -> bool {
        self.transport_failed.load(Ordering::SeqCst)
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::SeqCst)
    }

    /// Request process exit with `code`.
    ///
    /// A failed transport always forces the immediate path, even when a
    /// graceful exit is already in progress. Otherwise the first call wins
    /// and later calls get [`ExitAction::AlreadyExiting`].
    pub fn request_exit(&self, code: i32) -> ExitAction {
        if self.transport_failed() {
            self.shutting_down.store(true, Ordering::SeqCst);
            self.exit_code.store(code, Ordering::SeqCst);
            let _ = self.shutdown_tx.send(true);
            return ExitAction::Immediate { code };
        }
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return ExitAction::AlreadyExiting;
        }
        self.exit_code.store(code, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(true);
        ExitAction::Graceful { code }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_exit_is_idempotent() {
        let lifecycle = Lifecycle::new();
        assert_eq!(
            lifecycle.request_exit(0),
            ExitAction::Graceful { code: 0 }
        );
        // The second request must not trigger the disconnect again
        assert_eq!(lifecycle.request_exit(0), ExitAction::AlreadyExiting);
        assert_eq!(lifecycle.request_exit(2), ExitAction::AlreadyExiting);
        assert_eq!(lifecycle.exit_code(), 0);
    }

    #[test]
    fn transport_failure_is_recorded_once() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.mark_transport_failed());
        assert!(!lifecycle.mark_transport_failed());
        assert!(lifecycle.transport_failed());
    }

    #[test]
    fn transport_failure_forces_immediate_exit() {
        let lifecycle = Lifecycle::new();
        lifecycle.mark_transport_failed();
        assert_eq!(
            lifecycle.request_exit(1),
            ExitAction::Immediate { code: 1 }
        );
        assert_eq!(lifecycle.exit_code(), 1);
    }

    #[test]
    fn transport_failure_overrides_graceful_exit_in_progress() {
        let lifecycle = Lifecycle::new();
        assert_eq!(
            lifecycle.request_exit(0),
            ExitAction::Graceful { code: 0 }
        );
        lifecycle.mark_transport_failed();
        assert_eq!(
            lifecycle.request_exit(1),
            ExitAction::Immediate { code: 1 }
        );
    }

    #[tokio::test]
    async fn shutdown_signal_fires_on_request() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.shutdown_signal();
        assert!(!lifecycle.is_shutting_down());
        lifecycle.request_exit(0);
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
        assert!(lifecycle.is_shutting_down());
    }
}
