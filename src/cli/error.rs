use std::io;

use thiserror::Error;

use crate::cli::CommandName;
use crate::registry::RegistrationConflict;
use crate::server::BoxError;

/// Errors reported at the top level, each prefixed by the failing command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The first argument names no known command.
    #[error("unknown command \"{name}\"\nRun 'tsdbd help' for usage")]
    UnknownCommand { name: String },

    /// The server failed to start. Supervision never began.
    #[error("run: {source}")]
    Startup {
        #[source]
        source: BoxError,
    },

    /// Signal handlers could not be installed.
    #[error("run: install signal handlers: {0}")]
    Signals(#[source] io::Error),

    /// A one-shot command failed.
    #[error("{command}: {source}")]
    Failed {
        command: CommandName,
        #[source]
        source: BoxError,
    },

    /// Two subsystems registered under one name. A build defect.
    #[error("init: {0}")]
    Registration(#[from] RegistrationConflict),
}

impl CommandError {
    /// The command that failed, when known.
    pub fn command(&self) -> Option<CommandName> {
        match self {
            CommandError::Startup { .. } | CommandError::Signals(_) => Some(CommandName::Run),
            CommandError::Failed { command, .. } => Some(*command),
            CommandError::UnknownCommand { .. } | CommandError::Registration(_) => None,
        }
    }
}
