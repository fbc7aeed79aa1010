//! tsdb daemon library.

// Command line
pub mod cli;
pub mod commands;

// Core subsystems
pub mod config;
pub mod http;
pub mod server;
pub mod tsdb;

// Cross-cutting concerns
pub mod lifecycle;
pub mod monitor;
pub mod observability;
pub mod registry;

pub use cli::{CommandError, Dispatcher, Subsystems};
pub use config::{BuildInfo, DaemonConfig};
pub use lifecycle::{ShutdownCoordinator, ShutdownOutcome};
pub use server::{RunCommand, Server};
