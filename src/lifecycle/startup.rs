//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the server with signal handlers already in place
//! - Hand a started server to the shutdown coordinator
//!
//! # Design Decisions
//! - Fail fast: a startup error is returned before supervision begins
//! - No partial-start cleanup here; the server unwinds its own state

use std::sync::Arc;

use crate::lifecycle::shutdown::{ShutdownCoordinator, ShutdownOutcome};
use crate::lifecycle::signals::SignalListener;
use crate::server::{BoxError, Server};

/// Start `server`, then block until shutdown completes.
///
/// `signals` is taken already installed, so a signal that arrives while the
/// server is starting is queued and handled once startup succeeds.
pub async fn start_and_supervise(
    server: Arc<dyn Server>,
    args: &[String],
    mut signals: SignalListener,
) -> Result<ShutdownOutcome, BoxError> {
    server.start(args).await?;

    let coordinator = ShutdownCoordinator::new(server.shutdown_timeout());
    Ok(coordinator.supervise(server, &mut signals).await)
}
