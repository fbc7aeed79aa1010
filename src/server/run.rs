//! The `run` server: storage, HTTP service and monitor.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Open the configured engine through the engine registry
//! - Start the HTTP service, monitor loop and metrics exporter
//! - Tear everything down on close and report completion
//!
//! # Design Decisions
//! - Startup order: config → pidfile → store → listener; a failure unwinds
//!   whatever already started, in reverse
//! - Listener binds before `start` returns, so "started" means reachable
//! - Close always fires the completion notification, even if a step failed
//! - One-shot: a server starts at most once; a failed start may be retried,
//!   a closed server cannot be restarted

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::cli::args::{parse_args, ArgsError, RunArgs};
use crate::config::{load_config, BuildInfo, ConfigError, DaemonConfig};
use crate::http::{AppState, HttpServer, HttpStats};
use crate::lifecycle::Shutdown;
use crate::monitor::{Monitor, StatisticsReporter};
use crate::observability::metrics;
use crate::server::{
    closed_channel, BoxError, Closed, ClosedNotifier, Server, DEFAULT_SHUTDOWN_TIMEOUT,
};
use crate::tsdb::{EngineError, EngineRegistry, Store};

/// Errors raised while starting or closing the run server.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("pidfile {path}: {source}")]
    Pidfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("open store: {0}")]
    Store(#[from] EngineError),

    #[error("bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server already started")]
    AlreadyStarted,

    #[error("server is closed and cannot be restarted")]
    Closed,

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything a started server owns.
struct Running {
    store: Arc<Store>,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<()>>,
    pidfile: Option<PathBuf>,
}

/// Where a [`RunCommand`] is in its one-shot lifecycle.
enum Phase {
    Idle,
    Starting,
    Running(Running),
    Closed,
}

/// The daemon's primary server.
pub struct RunCommand {
    build: BuildInfo,
    engines: EngineRegistry,
    // Set once, by the only successful start.
    config: OnceLock<DaemonConfig>,
    phase: Mutex<Phase>,
    notifier: ClosedNotifier,
    http_addr: OnceLock<SocketAddr>,
}

impl RunCommand {
    pub fn new(build: BuildInfo, engines: EngineRegistry) -> Self {
        let (notifier, _) = closed_channel();
        Self {
            build,
            engines,
            config: OnceLock::new(),
            phase: Mutex::new(Phase::Idle),
            notifier,
            http_addr: OnceLock::new(),
        }
    }

    /// Configuration in effect once started.
    pub fn config(&self) -> Option<&DaemonConfig> {
        self.config.get()
    }

    /// Address the HTTP service is bound to, once started.
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http_addr.get().copied()
    }

    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn start_inner(&self, args: &[String]) -> Result<(), RunError> {
        let args: RunArgs = parse_args(args)?;
        {
            let mut phase = self.lock_phase();
            match *phase {
                Phase::Idle => *phase = Phase::Starting,
                Phase::Starting | Phase::Running(_) => return Err(RunError::AlreadyStarted),
                Phase::Closed => return Err(RunError::Closed),
            }
        }

        match self.bring_up(args).await {
            Ok(running) => {
                let leftover = {
                    let mut phase = self.lock_phase();
                    if matches!(*phase, Phase::Starting) {
                        *phase = Phase::Running(running);
                        None
                    } else {
                        Some(running)
                    }
                };
                match leftover {
                    None => Ok(()),
                    Some(running) => {
                        // Closed while starting.
                        tracing::warn!("Server closed during startup");
                        self.tear_down(running).await?;
                        Err(RunError::Closed)
                    }
                }
            }
            Err(e) => {
                let mut phase = self.lock_phase();
                if matches!(*phase, Phase::Starting) {
                    *phase = Phase::Idle;
                }
                Err(e)
            }
        }
    }

    /// Start every component. On failure, whatever already started is undone.
    async fn bring_up(&self, args: RunArgs) -> Result<Running, RunError> {
        let engine_names = self.engines.names();
        let config = load_config(args.config.as_deref(), Some(engine_names.as_slice()))?;

        tracing::info!(
            version = self.build.version,
            branch = self.build.branch,
            commit = self.build.commit,
            "tsdb starting"
        );

        if let Some(path) = &args.pidfile {
            write_pidfile(path)?;
        }

        let store = match Store::open(&self.engines, &config.data) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                remove_pidfile(args.pidfile.as_deref());
                return Err(e.into());
            }
        };

        let listener = if config.http.enabled {
            match TcpListener::bind(&config.http.bind_address).await {
                Ok(listener) => Some(listener),
                Err(source) => {
                    if let Err(e) = store.close() {
                        tracing::warn!(error = %e, "Failed to close store after startup failure");
                    }
                    remove_pidfile(args.pidfile.as_deref());
                    return Err(RunError::Bind {
                        addr: config.http.bind_address.clone(),
                        source,
                    });
                }
            }
        } else {
            None
        };

        let shutdown = Shutdown::new();
        let mut tasks = Vec::new();
        let mut http_addr = None;

        let mut monitor = Monitor::new(config.monitor.global_tags.clone())
            .with_reporter(Arc::clone(&store) as Arc<dyn StatisticsReporter>);

        let http_stats = Arc::new(HttpStats::new(config.http.bind_address.as_str()));
        if listener.is_some() {
            monitor = monitor.with_reporter(Arc::clone(&http_stats) as Arc<dyn StatisticsReporter>);
        }
        let monitor = Arc::new(monitor);

        if let Some(listener) = listener {
            http_addr = listener.local_addr().ok();
            let server = HttpServer::new(AppState {
                monitor: Arc::clone(&monitor),
                store: Arc::clone(&store),
                stats: http_stats,
                build: self.build,
            });
            let rx = shutdown.subscribe();
            tasks.push(tokio::spawn(async move {
                if let Err(e) = server.run(listener, rx).await {
                    tracing::error!(error = %e, "HTTP server failed");
                }
            }));
        }

        if config.observability.metrics_enabled {
            match config.observability.metrics_address.parse() {
                Ok(addr) => {
                    if let Err(e) = metrics::init_metrics(addr) {
                        tracing::error!(error = %e, "Failed to start metrics endpoint");
                    }
                }
                Err(_) => tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                ),
            }
        }

        if config.monitor.enabled {
            let interval = config.monitor.store_interval();
            tasks.push(tokio::spawn(Arc::clone(&monitor).run(interval, shutdown.subscribe())));
        }

        tracing::info!(
            engine = %config.data.engine,
            data_dir = %config.data.dir.display(),
            reporters = monitor.reporter_count(),
            "Server started"
        );

        // Only reachable once: later starts are rejected before bring_up.
        if let Some(addr) = http_addr {
            let _ = self.http_addr.set(addr);
        }
        let _ = self.config.set(config);

        Ok(Running {
            store,
            shutdown,
            tasks,
            pidfile: args.pidfile,
        })
    }

    async fn close_inner(&self) -> Result<(), RunError> {
        let previous = std::mem::replace(&mut *self.lock_phase(), Phase::Closed);
        match previous {
            Phase::Running(running) => self.tear_down(running).await,
            Phase::Idle | Phase::Starting | Phase::Closed => Ok(()),
        }
    }

    async fn tear_down(&self, running: Running) -> Result<(), RunError> {
        tracing::info!(tasks = running.tasks.len(), "Closing server");
        running.shutdown.trigger();
        for task in running.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Background task failed");
            }
        }

        let store = running.store;
        let closed = tokio::task::spawn_blocking(move || store.close()).await?;
        remove_pidfile(running.pidfile.as_deref());
        closed?;

        tracing::info!("Server closed");
        Ok(())
    }
}

impl Server for RunCommand {
    fn start<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move { self.start_inner(args).await.map_err(BoxError::from) })
    }

    fn close(&self) -> BoxFuture<'_, Result<(), BoxError>> {
        Box::pin(async move {
            let result = self.close_inner().await;
            self.notifier.notify();
            result.map_err(BoxError::from)
        })
    }

    fn closed(&self) -> Closed {
        self.notifier.subscribe()
    }

    fn shutdown_timeout(&self) -> Duration {
        self.config
            .get()
            .map(|c| c.shutdown.timeout())
            .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT)
    }
}

fn write_pidfile(path: &Path) -> Result<(), RunError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| RunError::Pidfile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, format!("{}\n", std::process::id())).map_err(|source| RunError::Pidfile {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_pidfile(path: Option<&Path>) {
    if let Some(path) = path {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove pidfile");
        }
    }
}
