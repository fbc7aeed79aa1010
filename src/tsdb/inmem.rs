//! In-memory storage engine.
//!
//! # Responsibilities
//! - Keep series in memory, sorted by timestamp
//! - Persist a JSON snapshot on close, reload it on open
//! - Report write counters to the monitor
//!
//! # Design Decisions
//! - Snapshot is written to a temp file, fsynced, then renamed, so a crash
//!   mid-write leaves the previous snapshot intact
//! - Counters are atomics; statistics never take the write lock

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock, TryLockError};

use crate::monitor::{Statistic, StatisticsReporter, Tags};
use crate::tsdb::engine::{Engine, EngineError, EngineOptions, Point};

type Series = BTreeMap<String, Vec<(i64, f64)>>;

/// Engine keeping all data in memory between snapshots.
#[derive(Debug, Default)]
pub struct MemEngine {
    series: RwLock<Series>,
    dir: Mutex<Option<PathBuf>>,
    points_written: AtomicU64,
    write_errors: AtomicU64,
}

impl MemEngine {
    pub const NAME: &'static str = "inmem";
    const SNAPSHOT: &'static str = "inmem.json";

    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot_path(dir: &Path) -> PathBuf {
        dir.join(Self::SNAPSHOT)
    }

    fn is_open(&self) -> bool {
        self.dir.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn load(path: &Path) -> Result<Series, EngineError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Series::new()),
            Err(source) => {
                return Err(EngineError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| EngineError::Snapshot {
            path: path.to_path_buf(),
            source,
        })
    }

    fn store(path: &Path, series: &Series) -> Result<(), EngineError> {
        let bytes = serde_json::to_vec(series).map_err(|source| EngineError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
        atomic_write(path, &bytes).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Write `contents` to a `*.tmp` sibling, fsync it, then rename over `path`.
fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "snapshot path has no parent directory")
    })?;
    let prefix = path.file_name().and_then(|name| name.to_str()).unwrap_or("snapshot");

    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

impl Engine for MemEngine {
    fn open(&self, options: &EngineOptions) -> Result<(), EngineError> {
        fs::create_dir_all(&options.dir).map_err(|source| EngineError::Io {
            path: options.dir.clone(),
            source,
        })?;

        let loaded = Self::load(&Self::snapshot_path(&options.dir))?;
        tracing::info!(
            engine = Self::NAME,
            dir = %options.dir.display(),
            series = loaded.len(),
            "Engine opened"
        );

        *self.series.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        *self.dir.lock().unwrap_or_else(PoisonError::into_inner) = Some(options.dir.clone());
        Ok(())
    }

    fn close(&self) -> Result<(), EngineError> {
        let Some(dir) = self.dir.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return Ok(());
        };

        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        Self::store(&Self::snapshot_path(&dir), &series)?;
        tracing::info!(engine = Self::NAME, series = series.len(), "Engine closed");
        Ok(())
    }

    fn write_points(&self, points: &[Point]) -> Result<(), EngineError> {
        if !self.is_open() {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
            return Err(EngineError::Closed);
        }

        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        for point in points {
            let samples = series.entry(point.series.clone()).or_default();
            let at = samples.partition_point(|(ts, _)| *ts <= point.timestamp);
            samples.insert(at, (point.timestamp, point.value));
        }
        self.points_written.fetch_add(points.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn read_series(&self, name: &str) -> Result<Vec<Point>, EngineError> {
        if !self.is_open() {
            return Err(EngineError::Closed);
        }

        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        Ok(series
            .get(name)
            .map(|samples| {
                samples
                    .iter()
                    .map(|&(ts, v)| Point::new(name, ts, v))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn series_count(&self) -> Option<usize> {
        match self.series.try_read() {
            Ok(series) => Some(series.len()),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner().len()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl StatisticsReporter for MemEngine {
    fn statistics(&self, tags: &Tags) -> Vec<Statistic> {
        let mut stat = Statistic::new("engine")
            .with_tag("engine", Self::NAME)
            .with_value("pointsWritten", self.points_written.load(Ordering::Relaxed))
            .with_value("writeErrors", self.write_errors.load(Ordering::Relaxed));
        // Skipped while a writer holds the lock.
        if let Some(count) = self.series_count() {
            stat = stat.with_value("series", count);
        }
        vec![stat.merge_tags(tags)]
    }
}
