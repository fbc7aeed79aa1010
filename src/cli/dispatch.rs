//! Command routing.
//!
//! # Responsibilities
//! - Resolve the command name to exactly one subsystem
//! - Run `run` under signal supervision, everything else to completion
//! - Attach the command name to any failure
//!
//! # Design Decisions
//! - An unknown name fails before any subsystem is touched
//! - Signal handlers are installed before `Server::start`
//! - The signal source is injectable so dispatch can be tested in-process

use std::io;
use std::sync::Arc;

use crate::cli::args::{help_text, wants_help, RunArgs};
use crate::cli::{Command, CommandError, CommandName, Output};
use crate::commands::{
    BackupCommand, HelpCommand, PrintConfigCommand, RestoreCommand, Subcommand, VersionCommand,
};
use crate::config::BuildInfo;
use crate::lifecycle::{start_and_supervise, ShutdownOutcome, SignalListener};
use crate::server::run::RunCommand;
use crate::server::Server;
use crate::tsdb::EngineRegistry;

type SignalSource = Box<dyn Fn() -> io::Result<SignalListener> + Send + Sync>;

/// One handler per command.
pub struct Subsystems {
    pub server: Arc<dyn Server>,
    pub backup: Box<dyn Subcommand>,
    pub restore: Box<dyn Subcommand>,
    pub config: Box<dyn Subcommand>,
    pub version: Box<dyn Subcommand>,
    pub help: Box<dyn Subcommand>,
}

impl Subsystems {
    /// The production set, writing to `out`.
    pub fn standard(build: BuildInfo, engines: EngineRegistry, out: Output) -> Self {
        Self {
            server: Arc::new(RunCommand::new(build, engines)),
            backup: Box::new(BackupCommand::new(out.clone())),
            restore: Box::new(RestoreCommand::new(out.clone())),
            config: Box::new(PrintConfigCommand::new(out.clone())),
            version: Box::new(VersionCommand::new(build, out.clone())),
            help: Box::new(HelpCommand::new(out)),
        }
    }
}

/// Routes argument lists to subsystems.
pub struct Dispatcher {
    subsystems: Subsystems,
    out: Output,
    signals: SignalSource,
}

impl Dispatcher {
    pub fn new(subsystems: Subsystems, out: Output) -> Self {
        Self {
            subsystems,
            out,
            signals: Box::new(SignalListener::install),
        }
    }

    /// Replace the OS signal handlers with another source.
    pub fn with_signal_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> io::Result<SignalListener> + Send + Sync + 'static,
    {
        self.signals = Box::new(source);
        self
    }

    /// Run the command named by `raw` (program name excluded).
    pub async fn dispatch(&self, raw: Vec<String>) -> Result<(), CommandError> {
        let command = Command::parse(raw);
        let Some(name) = CommandName::parse(&command.name) else {
            return Err(CommandError::UnknownCommand { name: command.name });
        };
        tracing::debug!(command = %name, "Dispatching");

        let handler = match name {
            CommandName::Run => return self.run(&command.args).await.map(|_| ()),
            CommandName::Backup => &self.subsystems.backup,
            CommandName::Restore => &self.subsystems.restore,
            CommandName::Config => &self.subsystems.config,
            CommandName::Version => &self.subsystems.version,
            CommandName::Help => &self.subsystems.help,
        };

        handler
            .run(&command.args)
            .await
            .map_err(|source| CommandError::Failed { command: name, source })
    }

    async fn run(&self, args: &[String]) -> Result<Option<ShutdownOutcome>, CommandError> {
        if wants_help(args) {
            self.out.write_str(&help_text::<RunArgs>());
            return Ok(None);
        }

        let signals = (self.signals)().map_err(CommandError::Signals)?;
        let outcome = start_and_supervise(self.subsystems.server.clone(), args, signals)
            .await
            .map_err(|source| CommandError::Startup { source })?;

        tracing::info!(?outcome, "Run finished");
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use futures_util::future::BoxFuture;

    use crate::lifecycle::Termination;
    use crate::server::{closed_channel, BoxError, Closed, ClosedNotifier};

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(&'static str, Vec<String>)>>,
    }

    struct Recording {
        name: &'static str,
        recorder: Arc<Recorder>,
        fail: bool,
    }

    impl Subcommand for Recording {
        fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
            Box::pin(async move {
                self.recorder.calls.lock().unwrap().push((self.name, args.to_vec()));
                if self.fail {
                    Err("boom".into())
                } else {
                    Ok(())
                }
            })
        }
    }

    struct QuickServer {
        starts: AtomicUsize,
        notifier: ClosedNotifier,
        closed: Closed,
        fail_start: bool,
    }

    impl QuickServer {
        fn new(fail_start: bool) -> Self {
            let (notifier, closed) = closed_channel();
            Self {
                starts: AtomicUsize::new(0),
                notifier,
                closed,
                fail_start,
            }
        }
    }

    impl Server for QuickServer {
        fn start<'a>(&'a self, _args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
            Box::pin(async move {
                self.starts.fetch_add(1, Ordering::SeqCst);
                if self.fail_start {
                    Err("address in use".into())
                } else {
                    Ok(())
                }
            })
        }

        fn close(&self) -> BoxFuture<'_, Result<(), BoxError>> {
            Box::pin(async move {
                self.notifier.notify();
                Ok(())
            })
        }

        fn closed(&self) -> Closed {
            self.closed.clone()
        }
    }

    fn dispatcher(server: Arc<QuickServer>, fail: bool) -> (Dispatcher, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let make = |name| -> Box<dyn Subcommand> {
            Box::new(Recording {
                name,
                recorder: recorder.clone(),
                fail,
            })
        };
        let subsystems = Subsystems {
            server,
            backup: make("backup"),
            restore: make("restore"),
            config: make("config"),
            version: make("version"),
            help: make("help"),
        };
        let (out, _) = Output::buffer();
        let dispatcher = Dispatcher::new(subsystems, out).with_signal_source(|| {
            let (tx, listener) = SignalListener::channel();
            tx.send(Termination::Terminate).ok();
            Ok(listener)
        });
        (dispatcher, recorder)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn unknown_command_invokes_nothing() {
        let server = Arc::new(QuickServer::new(false));
        let (dispatcher, recorder) = dispatcher(server.clone(), false);

        let err = dispatcher.dispatch(strings(&["bogus"])).await.unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand { ref name } if name == "bogus"));
        assert!(recorder.calls.lock().unwrap().is_empty());
        assert_eq!(server.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn routes_to_one_subsystem_with_remaining_args() {
        let server = Arc::new(QuickServer::new(false));
        let (dispatcher, recorder) = dispatcher(server, false);

        dispatcher.dispatch(strings(&["backup", "/tmp/b"])).await.unwrap();
        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("backup", strings(&["/tmp/b"]))]);
    }

    #[tokio::test]
    async fn failures_carry_command_name() {
        let server = Arc::new(QuickServer::new(false));
        let (dispatcher, _) = dispatcher(server, true);

        let err = dispatcher.dispatch(strings(&["restore", "x"])).await.unwrap_err();
        assert_eq!(err.to_string(), "restore: boom");
        assert_eq!(err.command(), Some(CommandName::Restore));
    }

    #[tokio::test]
    async fn empty_args_run_the_server() {
        let server = Arc::new(QuickServer::new(false));
        let (dispatcher, recorder) = dispatcher(server.clone(), false);

        dispatcher.dispatch(Vec::new()).await.unwrap();
        assert_eq!(server.starts.load(Ordering::SeqCst), 1);
        assert!(server.closed().is_closed());
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn startup_failure_is_prefixed_with_run() {
        let server = Arc::new(QuickServer::new(true));
        let (dispatcher, _) = dispatcher(server, false);

        let err = dispatcher.dispatch(strings(&["run"])).await.unwrap_err();
        assert_eq!(err.to_string(), "run: address in use");
    }

    #[tokio::test]
    async fn run_help_does_not_start() {
        let server = Arc::new(QuickServer::new(false));
        let (dispatcher, _) = dispatcher(server.clone(), false);

        dispatcher.dispatch(strings(&["help", "run"])).await.unwrap();
        assert_eq!(server.starts.load(Ordering::SeqCst), 0);
    }
}
