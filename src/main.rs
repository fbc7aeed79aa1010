//! tsdbd: the tsdb server daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv ──▶ cli::Dispatcher ──┬──▶ run ──▶ RunCommand (Server)
//!                              │             ├── tsdb::Store (engine registry)
//!                              │             ├── http (ping, health, debug vars)
//!                              │             └── monitor (statistics)
//!                              │                   ▲
//!                              │    lifecycle: signals ──▶ ShutdownCoordinator
//!                              │
//!                              └──▶ backup | restore | config | version | help
//! ```
//!
//! Exit status is 0 on success and on every shutdown path (clean, second
//! signal, time limit); 1 on any command error.

use tsdbd::cli::{CommandError, Dispatcher, Output, Subsystems};
use tsdbd::config::BuildInfo;
use tsdbd::observability::logging::{self, LogFormat};
use tsdbd::tsdb::builtin_engines;

#[tokio::main]
async fn main() {
    logging::init(LogFormat::from_env());

    let build = BuildInfo::current();
    let engines = match builtin_engines() {
        Ok(engines) => engines,
        Err(conflict) => {
            eprintln!("{}", CommandError::from(conflict));
            std::process::exit(1);
        }
    };

    let out = Output::stdout();
    let dispatcher = Dispatcher::new(Subsystems::standard(build, engines, out.clone()), out);

    let code = match dispatcher.dispatch(std::env::args().skip(1).collect()).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    };

    // Exit without waiting on tasks a hard shutdown left behind.
    std::process::exit(code);
}
