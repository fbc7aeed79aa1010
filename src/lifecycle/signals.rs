//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM (Ctrl-C on non-Unix)
//! - Translate every delivery into a queued [`Termination`] event
//!
//! # Design Decisions
//! - Handlers are registered synchronously in [`SignalListener::install`];
//!   signals delivered after that call are queued, never lost
//! - The queue is unbounded so forwarding never blocks delivery
//! - Forwarding tasks are aborted when the listener is dropped

use std::io;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A termination request from outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Interrupt,
    Terminate,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Interrupt => f.write_str("interrupt"),
            Termination::Terminate => f.write_str("terminate"),
        }
    }
}

/// Queue of termination events.
#[derive(Debug)]
pub struct SignalListener {
    rx: mpsc::UnboundedReceiver<Termination>,
    tasks: Vec<JoinHandle<()>>,
}

impl SignalListener {
    /// Register OS signal handlers and start forwarding into the queue.
    ///
    /// Must be called from within a Tokio runtime.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt = signal(SignalKind::interrupt())?;
        let terminate = signal(SignalKind::terminate())?;
        let (tx, rx) = mpsc::unbounded_channel();

        let tasks = vec![
            forward(interrupt, Termination::Interrupt, tx.clone()),
            forward(terminate, Termination::Terminate, tx),
        ];
        tracing::debug!("Signal handlers installed");
        Ok(Self { rx, tasks })
    }

    /// Register the Ctrl-C handler and start forwarding into the queue.
    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        let mut ctrl_c = tokio::signal::windows::ctrl_c()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while ctrl_c.recv().await.is_some() {
                if tx.send(Termination::Interrupt).is_err() {
                    break;
                }
            }
        });
        Ok(Self { rx, tasks: vec![task] })
    }

    /// A listener fed by hand instead of by the OS.
    pub fn channel() -> (mpsc::UnboundedSender<Termination>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx, tasks: Vec::new() })
    }

    /// Next termination event. `None` once every source is gone.
    pub async fn recv(&mut self) -> Option<Termination> {
        self.rx.recv().await
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(unix)]
fn forward(
    mut signal: tokio::signal::unix::Signal,
    kind: Termination,
    tx: mpsc::UnboundedSender<Termination>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signal.recv().await.is_some() {
            tracing::trace!(signal = %kind, "Signal delivered");
            if tx.send(kind).is_err() {
                break;
            }
        }
    })
}
