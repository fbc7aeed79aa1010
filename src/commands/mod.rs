//! One-shot commands.
//!
//! # Responsibilities
//! - `version`, `help`, `config`: print to the command output
//! - `backup`, `restore`: offline copies of the data directory
//!
//! # Design Decisions
//! - Every command implements [`Subcommand`]; the dispatcher never sees
//!   concrete types
//! - `-h` prints the command's help and succeeds

pub mod backup;
pub mod help;
pub mod print_config;
pub mod restore;
pub mod version;

use futures_util::future::BoxFuture;

use crate::server::BoxError;

pub use backup::BackupCommand;
pub use help::HelpCommand;
pub use print_config::PrintConfigCommand;
pub use restore::RestoreCommand;
pub use version::VersionCommand;

/// A command that runs to completion.
pub trait Subcommand: Send + Sync {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>>;
}
