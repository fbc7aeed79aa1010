//! Offline backup of the data directory.
//!
//! # Responsibilities
//! - Resolve the data directory from configuration
//! - Copy it file by file into an empty target directory
//!
//! # Design Decisions
//! - Refuses to write into a non-empty target
//! - Skips `*.tmp` files left behind by interrupted snapshot writes

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::cli::args::{parse_or_help, BackupArgs};
use crate::cli::Output;
use crate::commands::Subcommand;
use crate::config::load_config;
use crate::server::BoxError;

/// Errors raised by `backup` and `restore`.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("{0} does not exist")]
    Missing(PathBuf),

    #[error("{0} is not empty")]
    NotEmpty(PathBuf),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("copy task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> BackupError + '_ {
    move |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Whether `path` is absent or an empty directory.
pub(crate) fn is_absent_or_empty(path: &Path) -> Result<bool, BackupError> {
    match fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(io_err(path)(e)),
    }
}

/// Recursively copy `src` into `dst`, returning the number of files copied.
pub(crate) fn copy_dir(src: &Path, dst: &Path) -> Result<usize, BackupError> {
    fs::create_dir_all(dst).map_err(io_err(dst))?;

    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(io_err(src))? {
        let entry = entry.map_err(io_err(src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(io_err(&from))?;

        if file_type.is_dir() {
            copied += copy_dir(&from, &to)?;
        } else if file_type.is_file() {
            if from.extension().is_some_and(|ext| ext == "tmp") {
                continue;
            }
            fs::copy(&from, &to).map_err(io_err(&from))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// `tsdbd backup`: copies the data directory into a backup directory.
pub struct BackupCommand {
    out: Output,
}

impl BackupCommand {
    pub fn new(out: Output) -> Self {
        Self { out }
    }
}

impl Subcommand for BackupCommand {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let Some(args) = parse_or_help::<BackupArgs>(args, &self.out)? else {
                return Ok(());
            };
            let config = load_config(args.config.as_deref(), None)?;
            let source = config.data.dir;
            let target = args.path;

            if !source.is_dir() {
                return Err(BackupError::Missing(source).into());
            }
            if !is_absent_or_empty(&target)? {
                return Err(BackupError::NotEmpty(target).into());
            }

            tracing::info!(
                source = %source.display(),
                target = %target.display(),
                "Starting backup"
            );
            let (files, target) = tokio::task::spawn_blocking(move || {
                copy_dir(&source, &target).map(|files| (files, target))
            })
            .await
            .map_err(BackupError::from)??;

            self.out
                .write_line(&format!("backed up {} files to {}", files, target.display()));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &Path, data: &Path) -> PathBuf {
        let path = dir.join("tsdb.toml");
        fs::write(&path, format!("[data]\ndir = {:?}\n", data.display().to_string())).unwrap();
        path
    }

    #[test]
    fn copy_dir_skips_temp_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::create_dir(src.path().join("wal")).unwrap();
        fs::write(src.path().join("inmem.json"), "{}").unwrap();
        fs::write(src.path().join("inmem.json.tmp"), "partial").unwrap();
        fs::write(src.path().join("wal/0001"), "x").unwrap();

        let copied = copy_dir(src.path(), &dst.path().join("out")).unwrap();
        assert_eq!(copied, 2);
        assert!(dst.path().join("out/wal/0001").exists());
        assert!(!dst.path().join("out/inmem.json.tmp").exists());
    }

    #[tokio::test]
    async fn backup_copies_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("inmem.json"), "{}").unwrap();
        let config = config_for(dir.path(), &data);
        let target = dir.path().join("backup");

        let (out, buf) = Output::buffer();
        BackupCommand::new(out)
            .run(&[
                "--config".to_string(),
                config.display().to_string(),
                target.display().to_string(),
            ])
            .await
            .unwrap();

        assert!(target.join("inmem.json").exists());
        assert!(buf.contents().starts_with("backed up 1 files to "));
    }

    #[tokio::test]
    async fn backup_refuses_non_empty_target() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        let config = config_for(dir.path(), &data);
        let target = dir.path().join("backup");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("old"), "x").unwrap();

        let (out, _) = Output::buffer();
        let err = BackupCommand::new(out)
            .run(&[
                "-c".to_string(),
                config.display().to_string(),
                target.display().to_string(),
            ])
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("is not empty"));
    }

    #[tokio::test]
    async fn backup_requires_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &dir.path().join("missing"));

        let (out, _) = Output::buffer();
        let err = BackupCommand::new(out)
            .run(&[
                "-c".to_string(),
                config.display().to_string(),
                dir.path().join("backup").display().to_string(),
            ])
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("does not exist"));
    }
}
