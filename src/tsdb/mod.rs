//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! DataConfig { dir, engine }
//!     → EngineRegistry::create(engine)   (engine.rs, explicit builtin list)
//!     → Engine::open(dir)                 (e.g. inmem.rs)
//!     → Store (owns the engine, reports statistics)
//! ```
//!
//! # Design Decisions
//! - The store only knows engines by name; adding an engine means adding
//!   one line to `builtin_engines`, nothing else
//! - Engines are created closed and opened explicitly, so construction
//!   never touches the filesystem

pub mod engine;
pub mod inmem;

use std::path::{Path, PathBuf};

pub use engine::{builtin_engines, Engine, EngineError, EngineOptions, EngineRegistry, Point};

use crate::config::DataConfig;
use crate::monitor::{Statistic, StatisticsReporter, Tags};

/// An open storage engine plus where it lives.
pub struct Store {
    engine: Box<dyn Engine>,
    engine_name: String,
    path: PathBuf,
}

impl Store {
    /// Create the configured engine from `registry` and open it.
    pub fn open(registry: &EngineRegistry, config: &DataConfig) -> Result<Self, EngineError> {
        let engine = registry.create(&config.engine).ok_or_else(|| EngineError::Unknown {
            name: config.engine.clone(),
        })?;

        engine.open(&EngineOptions {
            dir: config.dir.clone(),
        })?;

        Ok(Self {
            engine,
            engine_name: config.engine.clone(),
            path: config.dir.clone(),
        })
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the underlying engine.
    pub fn close(&self) -> Result<(), EngineError> {
        self.engine.close()
    }
}

impl StatisticsReporter for Store {
    fn statistics(&self, tags: &Tags) -> Vec<Statistic> {
        let own = Statistic::new("store")
            .with_tag("engine", self.engine_name.as_str())
            .with_tag("path", self.path.display().to_string())
            .merge_tags(tags);

        let mut stats = vec![own];
        stats.extend(self.engine.statistics(tags));
        stats
    }
}
