use std::fs;

use futures_util::future::BoxFuture;

use crate::cli::args::{parse_or_help, RestoreArgs};
use crate::cli::Output;
use crate::commands::backup::{copy_dir, is_absent_or_empty, BackupError};
use crate::commands::Subcommand;
use crate::config::load_config;
use crate::server::BoxError;

/// `tsdbd restore`: copies a backup directory back into the data directory.
///
/// The daemon must not be running; the restored snapshot is picked up on
/// the next `run`.
pub struct RestoreCommand {
    out: Output,
}

impl RestoreCommand {
    pub fn new(out: Output) -> Self {
        Self { out }
    }
}

impl Subcommand for RestoreCommand {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let Some(args) = parse_or_help::<RestoreArgs>(args, &self.out)? else {
                return Ok(());
            };
            let config = load_config(args.config.as_deref(), None)?;
            let source = args.path;
            let target = config.data.dir;

            if !source.is_dir() {
                return Err(BackupError::Missing(source).into());
            }
            if !is_absent_or_empty(&target)? {
                if !args.force {
                    return Err(BackupError::NotEmpty(target).into());
                }
                tracing::warn!(target = %target.display(), "Replacing existing data directory");
                fs::remove_dir_all(&target).map_err(|source| BackupError::Io {
                    path: target.clone(),
                    source,
                })?;
            }

            tracing::info!(
                source = %source.display(),
                target = %target.display(),
                "Starting restore"
            );
            let (files, target) = tokio::task::spawn_blocking(move || {
                copy_dir(&source, &target).map(|files| (files, target))
            })
            .await
            .map_err(BackupError::from)??;

            self.out
                .write_line(&format!("restored {} files to {}", files, target.display()));
            Ok(())
        })
    }
}
