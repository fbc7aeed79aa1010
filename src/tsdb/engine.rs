//! Storage engine contract and the built-in engine list.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitor::StatisticsReporter;
use crate::registry::{RegistrationConflict, Registry, RegistryBuilder};
use crate::tsdb::inmem::MemEngine;

/// Registry of storage engine factories.
pub type EngineRegistry = Registry<dyn Engine>;

/// Errors raised by storage engines.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine {name:?} is not registered")]
    Unknown { name: String },

    #[error("engine is not open")]
    Closed,

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where and how an engine stores its data.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub dir: PathBuf,
}

/// One sample in a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub series: String,
    pub timestamp: i64,
    pub value: f64,
}

impl Point {
    pub fn new(series: impl Into<String>, timestamp: i64, value: f64) -> Self {
        Self {
            series: series.into(),
            timestamp,
            value,
        }
    }
}

/// A pluggable storage engine.
///
/// Engines are constructed closed by their registered factory and opened
/// with [`Engine::open`].
pub trait Engine: StatisticsReporter {
    /// Open the engine, loading any existing data under `options.dir`.
    fn open(&self, options: &EngineOptions) -> Result<(), EngineError>;

    /// Flush and close. Closing a closed engine is a no-op.
    fn close(&self) -> Result<(), EngineError>;

    /// Append points.
    fn write_points(&self, points: &[Point]) -> Result<(), EngineError>;

    /// Points in `series`, ordered by timestamp.
    fn read_series(&self, series: &str) -> Result<Vec<Point>, EngineError>;

    /// Number of distinct series, or `None` if it cannot be read without
    /// waiting on a writer.
    fn series_count(&self) -> Option<usize>;
}

/// Registry holding every engine linked into this binary.
pub fn builtin_engines() -> Result<EngineRegistry, RegistrationConflict> {
    let mut builder = RegistryBuilder::<dyn Engine>::new("engine");
    builder.register(MemEngine::NAME, || Box::new(MemEngine::new()))?;
    Ok(builder.build())
}
