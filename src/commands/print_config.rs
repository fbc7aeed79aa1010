use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::cli::args::{parse_or_help, ConfigArgs};
use crate::cli::Output;
use crate::commands::Subcommand;
use crate::config::load_config;
use crate::server::BoxError;

#[derive(Debug, Error)]
#[error("encode: {0}")]
pub struct EncodeError(#[from] toml::ser::Error);

/// `tsdbd config`: prints the effective configuration as TOML.
pub struct PrintConfigCommand {
    out: Output,
}

impl PrintConfigCommand {
    pub fn new(out: Output) -> Self {
        Self { out }
    }
}

impl Subcommand for PrintConfigCommand {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let Some(args) = parse_or_help::<ConfigArgs>(args, &self.out)? else {
                return Ok(());
            };

            // Engine names are checked by `run`, not here.
            let config = load_config(args.config.as_deref(), None)?;
            let text = toml::to_string_pretty(&config).map_err(EncodeError::from)?;
            self.out.write_str(&text);
            Ok(())
        })
    }
}
