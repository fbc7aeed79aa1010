//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → queued Termination events
//!
//! Startup (startup.rs):
//!     Install signals → Server::start → hand over to coordinator
//!
//! Shutdown (shutdown.rs):
//!     First signal → spawn Server::close
//!     → race { second signal, deadline, Closed } → exit
//! ```
//!
//! # Design Decisions
//! - Signal handlers are installed before the server starts
//! - A second SIGTERM/SIGINT forces exit
//! - Shutdown has a timeout: forced exit after the deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownCoordinator, ShutdownError, ShutdownOutcome, ShutdownState};
pub use signals::{SignalListener, Termination};
pub use startup::start_and_supervise;
