//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tsdbd::server::{closed_channel, BoxError, Closed, ClosedNotifier, Server};

/// What a [`MockServer`] does when asked to close.
#[derive(Debug, Clone, Copy)]
pub enum CloseBehavior {
    /// Report completion after the given delay.
    After(Duration),
    /// Never report completion.
    Hang,
    /// Report completion, then return an error.
    Fail,
}

/// A server whose start and close are scripted.
pub struct MockServer {
    pub starts: AtomicUsize,
    pub closes: AtomicUsize,
    behavior: CloseBehavior,
    fail_start: bool,
    timeout: Duration,
    notifier: ClosedNotifier,
    closed: Closed,
}

impl MockServer {
    pub fn new(behavior: CloseBehavior, timeout: Duration) -> Self {
        let (notifier, closed) = closed_channel();
        Self {
            starts: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            behavior,
            fail_start: false,
            timeout,
            notifier,
            closed,
        }
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Server for MockServer {
    fn start<'a>(&'a self, _args: &'a [String]) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                return Err("bind 127.0.0.1:8086: address in use".into());
            }
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<(), BoxError>> {
        Box::pin(async move {
            self.closes.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                CloseBehavior::After(delay) => {
                    tokio::time::sleep(delay).await;
                    self.notifier.notify();
                    Ok(())
                }
                CloseBehavior::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
                CloseBehavior::Fail => {
                    self.notifier.notify();
                    Err("flush failed".into())
                }
            }
        })
    }

    fn closed(&self) -> Closed {
        self.closed.clone()
    }

    fn shutdown_timeout(&self) -> Duration {
        self.timeout
    }
}

/// Owned argument list.
pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Write a config file that keeps data under `dir` and binds HTTP to an
/// ephemeral port.
pub fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("tsdb.toml");
    let body = format!(
        concat!(
            "[data]\ndir = {:?}\n\n",
            "[http]\nbind_address = \"127.0.0.1:0\"\n\n",
            "[monitor]\nenabled = false\n{}\n",
        ),
        dir.join("data").display().to_string(),
        extra,
    );
    std::fs::write(&path, body).unwrap();
    path
}
