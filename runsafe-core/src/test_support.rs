//! Helpers shared by unit, behaviour, and downstream crate tests.

use std::cell::Cell;

use geo::{Coord, Rect};

use crate::{CrashRecord, CrashStore, Metric, StoreError};

/// Date stamped on crashes built by [`crash`].
pub const TEST_CRASH_DATE: &str = "2025-01-01";

/// Build a casualty-free crash at `x` (longitude) and `y` (latitude).
///
/// # Panics
/// Panics when the coordinates are outside WGS84 bounds.
#[must_use]
#[expect(clippy::expect_used, reason = "test helper with fixed coordinates")]
pub fn crash(id: u64, x: f64, y: f64) -> CrashRecord {
    CrashRecord::new(id, TEST_CRASH_DATE, Coord { x, y }).expect("test coordinates are valid")
}

/// Store whose every query fails as if the database were unreachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

impl CrashStore for FailingStore {
    fn crashes_in_bbox(&self, _bbox: &Rect<f64>) -> Result<Vec<CrashRecord>, StoreError> {
        Err(StoreError::Connect {
            target: String::from("unreachable"),
            source: "connection refused".into(),
        })
    }
}

/// Wraps a store and counts the queries issued against it.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    inner: S,
    range_queries: Cell<usize>,
    aggregate_queries: Cell<usize>,
}

impl<S> CountingStore<S> {
    /// Wrap `inner`.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            range_queries: Cell::new(0),
            aggregate_queries: Cell::new(0),
        }
    }

    /// Number of `crashes_in_bbox` calls observed.
    #[must_use]
    pub fn range_queries(&self) -> usize {
        self.range_queries.get()
    }

    /// Number of `metric_in_bbox` calls observed.
    #[must_use]
    pub fn aggregate_queries(&self) -> usize {
        self.aggregate_queries.get()
    }
}

impl<S: CrashStore> CrashStore for CountingStore<S> {
    fn crashes_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<CrashRecord>, StoreError> {
        self.range_queries.set(self.range_queries.get() + 1);
        self.inner.crashes_in_bbox(bbox)
    }

    fn metric_in_bbox(&self, bbox: &Rect<f64>, metric: Metric) -> Result<u64, StoreError> {
        self.aggregate_queries.set(self.aggregate_queries.get() + 1);
        self.inner.metric_in_bbox(bbox, metric)
    }
}

/// Create a SQLite crash database at `path` holding `crashes`.
///
/// The schema is created when missing. Records whose identifier is already
/// stored are left untouched, mirroring ingestion.
///
/// # Errors
/// Returns any SQLite error raised while writing.
#[cfg(feature = "store-sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "store-sqlite")))]
pub fn write_crash_database(
    path: &std::path::Path,
    crashes: &[CrashRecord],
) -> rusqlite::Result<()> {
    let mut connection = rusqlite::Connection::open(path)?;
    connection.execute_batch(crate::CRASH_TABLE_SCHEMA)?;
    let tx = connection.transaction()?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO crashes (collision_id, crash_date, latitude, longitude, injuries, fatalities)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (collision_id) DO NOTHING",
        )?;
        for crash in crashes {
            let location = crash.location();
            insert.execute(rusqlite::params![
                crash.id(),
                crash.crash_date(),
                location.y,
                location.x,
                crash.injuries(),
                crash.fatalities(),
            ])?;
        }
    }
    tx.commit()
}
