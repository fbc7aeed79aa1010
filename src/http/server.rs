//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing)
//! - Serve on a bound listener until the shutdown broadcast fires
//! - Count requests for the monitor

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::BuildInfo;
use crate::http::handlers;
use crate::monitor::{Monitor, Statistic, StatisticsReporter, Tags};
use crate::tsdb::Store;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub store: Arc<Store>,
    pub stats: Arc<HttpStats>,
    pub build: BuildInfo,
}

/// Request counters for the HTTP service.
#[derive(Debug)]
pub struct HttpStats {
    bind_address: String,
    pub ping_requests: AtomicU64,
    pub health_requests: AtomicU64,
    pub vars_requests: AtomicU64,
    pub write_requests: AtomicU64,
    pub query_requests: AtomicU64,
}

impl HttpStats {
    pub fn new(bind_address: impl Into<String>) -> Self {
        Self {
            bind_address: bind_address.into(),
            ping_requests: AtomicU64::new(0),
            health_requests: AtomicU64::new(0),
            vars_requests: AtomicU64::new(0),
            write_requests: AtomicU64::new(0),
            query_requests: AtomicU64::new(0),
        }
    }
}

impl StatisticsReporter for HttpStats {
    fn statistics(&self, tags: &Tags) -> Vec<Statistic> {
        vec![Statistic::new("httpd")
            .with_tag("bind", self.bind_address.as_str())
            .with_value("pingReq", self.ping_requests.load(Ordering::Relaxed))
            .with_value("healthReq", self.health_requests.load(Ordering::Relaxed))
            .with_value("varsReq", self.vars_requests.load(Ordering::Relaxed))
            .with_value("writeReq", self.write_requests.load(Ordering::Relaxed))
            .with_value("queryReq", self.query_requests.load(Ordering::Relaxed))
            .merge_tags(tags)]
    }
}

/// HTTP server for the daemon.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/ping", get(handlers::ping))
            .route("/health", get(handlers::health))
            .route("/debug/vars", get(handlers::debug_vars))
            .route("/write", post(handlers::write))
            .route("/query", get(handlers::query))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{tags, Value};

    #[test]
    fn stats_report_request_counts() {
        let stats = HttpStats::new("127.0.0.1:8086");
        stats.ping_requests.fetch_add(2, Ordering::Relaxed);

        let out = stats.statistics(&tags([("host", "a")]));
        assert_eq!(out[0].name, "httpd");
        assert_eq!(out[0].values["pingReq"], Value::Integer(2));
        assert_eq!(out[0].tags["bind"], "127.0.0.1:8086");
        assert_eq!(out[0].tags["host"], "a");
    }
}
