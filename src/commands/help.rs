use futures_util::future::BoxFuture;

use crate::cli::Output;
use crate::commands::Subcommand;
use crate::server::BoxError;

pub const USAGE: &str = "\
Configure and start a tsdb server.

Usage: tsdbd [[command] [arguments]]

The commands are:

    backup               copies the data directory into a backup directory
    config               displays the effective configuration
    help                 display this help message
    restore              restores the data directory from a backup directory
    run                  run node with existing configuration
    version              displays the tsdb version

\"run\" is the default command.

Use \"tsdbd [command] -h\" for more information about a command.
";

/// `tsdbd help`: prints the command list.
pub struct HelpCommand {
    out: Output,
}

impl HelpCommand {
    pub fn new(out: Output) -> Self {
        Self { out }
    }
}

impl Subcommand for HelpCommand {
    fn run<'a>(&'a self, _args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            self.out.write_str(USAGE);
            Ok(())
        })
    }
}
