use futures_util::future::BoxFuture;

use crate::cli::args::{parse_or_help, VersionArgs};
use crate::cli::Output;
use crate::commands::Subcommand;
use crate::config::BuildInfo;
use crate::server::BoxError;

/// `tsdbd version`: prints the version, branch and commit.
pub struct VersionCommand {
    build: BuildInfo,
    out: Output,
}

impl VersionCommand {
    pub fn new(build: BuildInfo, out: Output) -> Self {
        Self { build, out }
    }
}

impl Subcommand for VersionCommand {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            if parse_or_help::<VersionArgs>(args, &self.out)?.is_some() {
                self.out.write_line(&self.build.to_string());
            }
            Ok(())
        })
    }
}
