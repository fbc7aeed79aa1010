//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize, apply TSDBD_* env overrides)
//!     → validation.rs (semantic checks)
//!     → DaemonConfig (validated, immutable)
//!
//! Build metadata:
//!     compile-time env → build.rs → BuildInfo (immutable, passed by value)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so a daemon runs without a config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod build;
pub mod loader;
pub mod schema;
pub mod validation;

pub use build::BuildInfo;
pub use loader::{load_config, ConfigError};
pub use schema::{
    DaemonConfig, DataConfig, HttpConfig, MonitorConfig, ObservabilityConfig, ShutdownConfig,
};
