//! Metrics exposition.
//!
//! # Responsibilities
//! - Install the Prometheus exporter when enabled
//! - Mirror monitor statistics into gauges
//!
//! # Metrics
//! Every statistic value becomes a gauge named `tsdb_<statistic>_<value>`,
//! labelled with the statistic's tags.
//!
//! # Design Decisions
//! - Without an installed exporter, recording is a no-op
//! - Gauges, not counters: statistics are sampled absolute values

use std::net::SocketAddr;

use metrics::Label;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::monitor::Statistic;

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Publish sampled statistics as gauges.
pub fn record_statistics(stats: &[Statistic]) {
    for stat in stats {
        let labels: Vec<Label> = stat
            .tags
            .iter()
            .map(|(k, v)| Label::new(sanitize(k), v.clone()))
            .collect();

        for (field, value) in &stat.values {
            let name = format!("tsdb_{}_{}", sanitize(&stat.name), sanitize(field));
            metrics::gauge!(name, labels.clone()).set(value.as_f64());
        }
    }
}

/// Prometheus names allow `[a-zA-Z0-9_]` only.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}
