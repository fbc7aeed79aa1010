//! Command-line subsystem.
//!
//! # Data Flow
//! ```text
//! argv[1..]
//!     → Command::parse (name + remaining args)
//!     → dispatch.rs (route to exactly one subsystem)
//!         run      → Server::start → ShutdownCoordinator
//!         backup   → Subcommand::run
//!         restore  → Subcommand::run
//!         config   → Subcommand::run
//!         version  → Subcommand::run
//!         help     → Subcommand::run
//!     → error.rs (prefix failures with the command name)
//! ```
//!
//! # Design Decisions
//! - No command means `run`: a bare `tsdbd` starts the server
//! - Command names are parsed by hand; flags per command by clap
//! - Subsystems are injected, so dispatch is testable without I/O

pub mod args;
pub mod dispatch;
pub mod error;
pub mod output;

use std::fmt;

pub use dispatch::{Dispatcher, Subsystems};
pub use error::CommandError;
pub use output::Output;

/// The fixed set of commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Run,
    Backup,
    Restore,
    Config,
    Version,
    Help,
}

impl CommandName {
    /// Resolve a command name. The empty name is `run`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "" | "run" => Some(CommandName::Run),
            "backup" => Some(CommandName::Backup),
            "restore" => Some(CommandName::Restore),
            "config" => Some(CommandName::Config),
            "version" => Some(CommandName::Version),
            "help" => Some(CommandName::Help),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Run => "run",
            CommandName::Backup => "backup",
            CommandName::Restore => "restore",
            CommandName::Config => "config",
            CommandName::Version => "version",
            CommandName::Help => "help",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed invocation: command name plus its own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Split raw arguments (without the program name) into a command.
    ///
    /// - A leading flag means no command name, except `-h`/`-help`/`--help`
    ///   which mean `help`.
    /// - `help <cmd>` becomes `<cmd> -h`.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = raw.into_iter().map(Into::into).collect();

        // An explicit empty name is `run`; everything after it is its args.
        if args.first().is_some_and(String::is_empty) {
            return Self {
                name: String::new(),
                args: args.into_iter().skip(1).collect(),
            };
        }

        let name = match args.first().map(String::as_str) {
            Some("-h" | "-help" | "--help") => "help".to_string(),
            Some(first) if !first.starts_with('-') => first.to_string(),
            _ => String::new(),
        };

        if name == "help" {
            if let Some(topic) = args.get(1).filter(|a| !a.starts_with('-')) {
                return Self {
                    name: topic.clone(),
                    args: vec!["-h".to_string()],
                };
            }
        }

        if name.is_empty() {
            Self { name, args }
        } else {
            Self {
                name,
                args: args.into_iter().skip(1).collect(),
            }
        }
    }
}
