//! Per-command flag definitions.

use std::path::PathBuf;

use clap::{error::ErrorKind, Parser};
use thiserror::Error;

use crate::cli::output::Output;

/// Flags of `tsdbd run`.
#[derive(Parser, Debug, Default)]
#[command(name = "tsdbd run", no_binary_name = true, about = "Runs the tsdb server")]
pub struct RunArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the process id to this file while running.
    #[arg(long)]
    pub pidfile: Option<PathBuf>,
}

/// Flags of `tsdbd backup`.
#[derive(Parser, Debug)]
#[command(
    name = "tsdbd backup",
    no_binary_name = true,
    about = "Copies the data directory into a backup directory"
)]
pub struct BackupArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to write the backup to. Must be absent or empty.
    pub path: PathBuf,
}

/// Flags of `tsdbd restore`.
#[derive(Parser, Debug)]
#[command(
    name = "tsdbd restore",
    no_binary_name = true,
    about = "Restores the data directory from a backup directory"
)]
pub struct RestoreArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Replace a non-empty data directory.
    #[arg(long)]
    pub force: bool,

    /// Backup directory to restore from.
    pub path: PathBuf,
}

/// Flags of `tsdbd config`.
#[derive(Parser, Debug)]
#[command(
    name = "tsdbd config",
    no_binary_name = true,
    about = "Displays the effective configuration"
)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Flags of `tsdbd version`.
#[derive(Parser, Debug)]
#[command(
    name = "tsdbd version",
    no_binary_name = true,
    about = "Displays the version, build branch and git commit hash"
)]
pub struct VersionArgs {}

/// Flag parsing failed, or help was requested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("help requested")]
    Help(String),

    #[error("{0}")]
    Invalid(String),
}

impl From<clap::Error> for ArgsError {
    fn from(err: clap::Error) -> Self {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                ArgsError::Help(err.render().to_string())
            }
            _ => {
                // clap renders "error: <msg>\n\nUsage: ..."; keep the first line only.
                let rendered = err.render().to_string();
                let first = rendered.lines().next().unwrap_or_default();
                ArgsError::Invalid(first.trim_start_matches("error: ").trim().to_string())
            }
        }
    }
}

/// Whether `args` asks for help.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| matches!(a.as_str(), "-h" | "-help" | "--help"))
}

/// Parse `args` (without the command name) into `T`.
pub fn parse_args<T: Parser>(args: &[String]) -> Result<T, ArgsError> {
    T::try_parse_from(args).map_err(ArgsError::from)
}

/// Parse `args`, printing help to `out` and returning `None` when requested.
pub fn parse_or_help<T: Parser>(args: &[String], out: &Output) -> Result<Option<T>, ArgsError> {
    match parse_args::<T>(args) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(ArgsError::Help(text)) => {
            out.write_str(&text);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Rendered help for `T`.
pub fn help_text<T: clap::CommandFactory>() -> String {
    T::command().render_help().to_string()
}
