//! Monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! Components (engine, httpd, ...)
//!     → reporter.rs (StatisticsReporter::statistics(tags))
//!     → Monitor (merges global tags, adds runtime stats)
//!     → Sinks:
//!         - /debug/vars (on demand)
//!         - periodic debug log + Prometheus gauges (on interval)
//! ```
//!
//! # Design Decisions
//! - Reporters are fixed when the monitor is built; no locking on read
//! - Global tags are caller tags: they override a statistic's own tags
//! - The monitor never fails; empty output is valid

pub mod reporter;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

pub use reporter::{tags, Statistic, StatisticsReporter, Tags, Value};

use crate::observability::metrics;

/// Aggregates statistics from every registered reporter.
pub struct Monitor {
    global_tags: Tags,
    reporters: Vec<Arc<dyn StatisticsReporter>>,
    started: Instant,
}

impl Monitor {
    /// Create a monitor with the tags merged into every statistic.
    pub fn new(global_tags: Tags) -> Self {
        Self {
            global_tags,
            reporters: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Add a reporter. Only possible before the monitor is shared.
    pub fn with_reporter(mut self, reporter: Arc<dyn StatisticsReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Number of registered reporters, not counting the monitor itself.
    pub fn reporter_count(&self) -> usize {
        self.reporters.len()
    }

    /// Collect statistics from all reporters, including the monitor's own.
    pub fn collect(&self) -> Vec<Statistic> {
        let mut stats = self.statistics(&self.global_tags);
        for reporter in &self.reporters {
            stats.extend(reporter.statistics(&self.global_tags));
        }
        stats
    }

    /// Periodically collect statistics until `shutdown` fires.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let stats = self.collect();
                    for stat in &stats {
                        tracing::debug!(
                            name = %stat.name,
                            tags = ?stat.tags,
                            values = ?stat.values,
                            "Statistic"
                        );
                    }
                    metrics::record_statistics(&stats);
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Monitor stopped");
                    return;
                }
            }
        }
    }
}

impl StatisticsReporter for Monitor {
    fn statistics(&self, tags: &Tags) -> Vec<Statistic> {
        vec![Statistic::new("runtime")
            .with_value("uptime_secs", self.started.elapsed().as_secs())
            .with_value("reporters", self.reporters.len())
            .merge_tags(tags)]
    }
}
