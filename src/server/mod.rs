//! Server subsystem contract.
//!
//! # Data Flow
//! ```text
//! dispatcher ──start(args)──▶ Server            (may fail: StartupError)
//! coordinator ──close()────▶ Server (spawned)   (may hang, may fail)
//! Server ──ClosedNotifier::notify()──▶ Closed   (completion signal)
//! ```
//!
//! # Design Decisions
//! - Completion is a separate notification, not the close future, so a
//!   server can report "fully closed" from wherever its teardown ends
//! - `Closed` is a watch receiver: late waiters still observe completion
//! - A notifier dropped without notifying also counts as closed; nothing
//!   can report completion after that

pub mod run;

use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::watch;

pub use run::RunCommand;

/// Error type at subsystem seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Deadline for a clean close when the server does not configure one.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// A long-running server supervised by the shutdown coordinator.
pub trait Server: Send + Sync + 'static {
    /// Start serving. Returns once the server is ready.
    ///
    /// On failure the server unwinds its own partial state.
    fn start<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>>;

    /// Begin an orderly close. May take arbitrarily long.
    fn close(&self) -> BoxFuture<'_, Result<(), BoxError>>;

    /// Completion notification, fired when close has fully finished.
    fn closed(&self) -> Closed;

    /// How long the coordinator waits for [`Server::closed`] after a signal.
    fn shutdown_timeout(&self) -> Duration {
        DEFAULT_SHUTDOWN_TIMEOUT
    }
}

/// Create a linked completion notifier and receiver.
pub fn closed_channel() -> (ClosedNotifier, Closed) {
    let (tx, rx) = watch::channel(false);
    (ClosedNotifier { tx }, Closed { rx })
}

/// Sending half of a completion notification.
#[derive(Debug)]
pub struct ClosedNotifier {
    tx: watch::Sender<bool>,
}

impl ClosedNotifier {
    /// Mark the server as fully closed. Idempotent.
    pub fn notify(&self) {
        self.tx.send_replace(true);
    }

    /// A new receiver for this notification.
    pub fn subscribe(&self) -> Closed {
        Closed {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving half of a completion notification.
#[derive(Debug, Clone)]
pub struct Closed {
    rx: watch::Receiver<bool>,
}

impl Closed {
    /// Whether completion has already been signalled.
    pub fn is_closed(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the server reports it has closed.
    pub async fn wait(mut self) {
        // Err means the notifier is gone.
        let _ = self.rx.wait_for(|closed| *closed).await;
    }
}
