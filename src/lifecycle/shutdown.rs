//! Shutdown coordination for the daemon.
//!
//! # States
//! ```text
//! Running ──first signal──▶ ShutdownRequested ──first of:──▶ ShutdownComplete
//!                                                 - second signal (hard)
//!                                                 - deadline      (hard)
//!                                                 - server closed (clean)
//! ```
//!
//! # Design Decisions
//! - The close routine runs in its own task; the coordinator never awaits it
//! - The second stage is a single `select!`; losers are dropped, so no
//!   outcome is logged or acted on twice
//! - Close errors are logged, never returned: the process exits regardless

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::lifecycle::signals::{SignalListener, Termination};
use crate::server::{BoxError, Server};

/// Broadcast used by a server's internal tasks to stop together.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown broadcast.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// The server's close routine failed. Logged, never propagated.
#[derive(Debug, Error)]
#[error("shutdown: {source}")]
pub struct ShutdownError {
    #[source]
    pub source: BoxError,
}

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShutdownRequested,
    ShutdownComplete,
}

/// How supervision ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The server reported its close finished.
    Completed,
    /// A second signal arrived before the close finished.
    SecondSignal(Termination),
    /// The deadline elapsed before the close finished.
    TimeLimit,
}

impl ShutdownOutcome {
    /// Whether the server finished closing before exit.
    pub fn is_clean(&self) -> bool {
        matches!(self, ShutdownOutcome::Completed)
    }

    /// Process exit status. Hard shutdowns are operator decisions, not errors.
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// Drives a started server from `Running` to `ShutdownComplete`.
pub struct ShutdownCoordinator {
    timeout: Duration,
    transitions: broadcast::Sender<ShutdownState>,
}

impl ShutdownCoordinator {
    /// Coordinator that forces exit `timeout` after the first signal.
    pub fn new(timeout: Duration) -> Self {
        let (transitions, _) = broadcast::channel(8);
        Self {
            timeout,
            transitions,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Observe state transitions. Subscribe before calling [`Self::supervise`].
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownState> {
        self.transitions.subscribe()
    }

    fn transition(&self, state: ShutdownState) {
        tracing::debug!(state = ?state, "Shutdown state transition");
        let _ = self.transitions.send(state);
    }

    /// Supervise an already started `server` until shutdown completes.
    ///
    /// `signals` must have been installed before the server was started.
    pub async fn supervise(
        &self,
        server: Arc<dyn Server>,
        signals: &mut SignalListener,
    ) -> ShutdownOutcome {
        self.transition(ShutdownState::Running);
        tracing::info!("Listening for signals");

        match signals.recv().await {
            Some(signal) => {
                tracing::info!(signal = %signal, "Signal received, initializing clean shutdown...");
            }
            None => {
                tracing::warn!("Signal listener closed, initializing clean shutdown...");
            }
        }
        self.transition(ShutdownState::ShutdownRequested);

        let closed = server.closed();
        tokio::spawn(async move {
            if let Err(source) = server.close().await {
                let err = ShutdownError { source };
                tracing::error!(error = %err, "Server close failed");
            }
        });

        tracing::info!(timeout_secs = self.timeout.as_secs(), "Waiting for clean shutdown...");
        let outcome = tokio::select! {
            Some(signal) = signals.recv() => {
                tracing::info!(
                    signal = %signal,
                    "Second signal received, initializing hard shutdown"
                );
                ShutdownOutcome::SecondSignal(signal)
            }
            _ = tokio::time::sleep(self.timeout) => {
                tracing::info!("Time limit reached, initializing hard shutdown");
                ShutdownOutcome::TimeLimit
            }
            _ = closed.wait() => {
                tracing::info!("Server shutdown completed");
                ShutdownOutcome::Completed
            }
        };

        self.transition(ShutdownState::ShutdownComplete);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_broadcast_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx1 = shutdown.subscribe();
        let mut rx2 = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[test]
    fn every_outcome_exits_zero() {
        assert_eq!(ShutdownOutcome::Completed.exit_code(), 0);
        assert_eq!(ShutdownOutcome::TimeLimit.exit_code(), 0);
        assert!(!ShutdownOutcome::SecondSignal(Termination::Interrupt).is_clean());
    }

    #[test]
    fn shutdown_error_is_prefixed() {
        let err = ShutdownError {
            source: "flush failed".into(),
        };
        assert_eq!(err.to_string(), "shutdown: flush failed");
    }
}
