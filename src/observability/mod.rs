//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → monitor (statistics) → metrics.rs (Prometheus gauges)
//!
//! Consumers:
//!     → stderr (text or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr; stdout belongs to commands like `version` and `config`
//! - Metrics are optional and fed from the monitor, not recorded inline

pub mod logging;
pub mod metrics;
