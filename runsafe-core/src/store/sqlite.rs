//! SQLite-backed crash store.
//!
//! Ingestion owns the `crashes` table; this module only reads it. Separate
//! indexes on `latitude` and `longitude` let SQLite satisfy both range
//! predicates of a bounding-box query.

use std::{
    fmt,
    time::{Duration, Instant},
};

use geo::Rect;
use log::warn;
use rusqlite::{Connection, ErrorCode, OpenFlags, Row, params, types::ValueRef};

use crate::{CrashRecord, Metric};

use super::{CrashStore, StoreError};

/// Schema expected by [`SqliteCrashStore`].
///
/// Ingestion inserts with `ON CONFLICT (collision_id) DO NOTHING`, so
/// re-ingesting a record is a no-op.
pub const CRASH_TABLE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS crashes (
    collision_id INTEGER PRIMARY KEY,
    crash_date TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    injuries INTEGER,
    fatalities INTEGER
);
CREATE INDEX IF NOT EXISTS crashes_latitude_idx ON crashes (latitude);
CREATE INDEX IF NOT EXISTS crashes_longitude_idx ON crashes (longitude);";

/// Number of malformed rows reported individually per query.
const MAX_MALFORMED_WARNINGS: usize = 5;

/// SQLite virtual machine steps between deadline checks.
const PROGRESS_CHECK_STEPS: i32 = 1_000;

macro_rules! bbox_predicate {
    () => {
        "latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4"
    };
}

// Rows that the record decoder would skip are excluded from aggregates so the
// baseline and the located totals count the same records.
macro_rules! well_formed_predicate {
    () => {
        "collision_id >= 0 \
         AND typeof(crash_date) IN ('text', 'integer', 'null') \
         AND typeof(latitude) IN ('integer', 'real') \
         AND typeof(longitude) IN ('integer', 'real') \
         AND latitude BETWEEN -90 AND 90 \
         AND longitude BETWEEN -180 AND 180 \
         AND (injuries IS NULL OR (typeof(injuries) = 'integer' \
              AND injuries BETWEEN 0 AND 4294967295)) \
         AND (fatalities IS NULL OR (typeof(fatalities) = 'integer' \
              AND fatalities BETWEEN 0 AND 4294967295))"
    };
}

const SELECT_IN_BBOX: &str = concat!(
    "SELECT collision_id, crash_date, latitude, longitude, injuries, fatalities \
     FROM crashes WHERE ",
    bbox_predicate!(),
    " ORDER BY collision_id"
);

const COUNT_IN_BBOX: &str = concat!(
    "SELECT COUNT(*) FROM crashes WHERE ",
    bbox_predicate!(),
    " AND ",
    well_formed_predicate!()
);

const SUM_INJURIES_IN_BBOX: &str = concat!(
    "SELECT COALESCE(SUM(injuries), 0) FROM crashes WHERE ",
    bbox_predicate!(),
    " AND ",
    well_formed_predicate!()
);

const SUM_FATALITIES_IN_BBOX: &str = concat!(
    "SELECT COALESCE(SUM(fatalities), 0) FROM crashes WHERE ",
    bbox_predicate!(),
    " AND ",
    well_formed_predicate!()
);

/// Connection settings for [`SqliteCrashStore`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use runsafe_core::StoreConfig;
///
/// let config = StoreConfig::new("crashes.db").with_query_timeout(Duration::from_secs(2));
/// assert_eq!(config.query_timeout, Some(Duration::from_secs(2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite path or `file:` URI of the crash database.
    pub connection_string: String,
    /// Deadline applied to each individual query; `None` waits indefinitely.
    pub query_timeout: Option<Duration>,
}

impl StoreConfig {
    /// Configuration for `connection_string` with no query deadline.
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            query_timeout: None,
        }
    }

    /// Apply a per-query deadline.
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }
}

/// Read-only crash store over a SQLite `crashes` table.
///
/// The store holds one connection for its whole lifetime; dropping the store
/// closes it, including when a query has failed.
pub struct SqliteCrashStore {
    connection: Connection,
    config: StoreConfig,
}

impl fmt::Debug for SqliteCrashStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCrashStore")
            .field("connection_string", &self.config.connection_string)
            .field("query_timeout", &self.config.query_timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct MalformedRow {
    id: i64,
    reason: &'static str,
}

impl SqliteCrashStore {
    /// Open the crash database described by `config` in read-only mode.
    ///
    /// # Errors
    /// Returns [`StoreError::Connect`] when the database cannot be opened or
    /// does not contain a `crashes` table.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let connect_error = |source: super::BackendError| StoreError::Connect {
            target: config.connection_string.clone(),
            source,
        };

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&config.connection_string, flags)
            .map_err(|source| connect_error(Box::new(source)))?;

        if let Some(timeout) = config.query_timeout {
            connection
                .busy_timeout(timeout)
                .map_err(|source| connect_error(Box::new(source)))?;
        }

        let has_table: bool = connection
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'crashes')",
                [],
                |row| row.get(0),
            )
            .map_err(|source| connect_error(Box::new(source)))?;
        if !has_table {
            return Err(connect_error("database has no crashes table".into()));
        }

        Ok(Self { connection, config })
    }

    /// Configuration the store was opened with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn with_deadline<T>(
        &self,
        operation: &'static str,
        run: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let deadline = self.config.query_timeout;
        if let Some(limit) = deadline {
            let started = Instant::now();
            self.connection
                .progress_handler(PROGRESS_CHECK_STEPS, Some(move || started.elapsed() > limit));
        }
        let result = run(&self.connection);
        if deadline.is_some() {
            self.connection.progress_handler(0, None::<fn() -> bool>);
        }

        result.map_err(|source| match (source.sqlite_error_code(), deadline) {
            (Some(ErrorCode::OperationInterrupted), Some(limit)) => StoreError::Timeout {
                operation,
                deadline: limit,
            },
            _ => StoreError::Query {
                operation,
                source: Box::new(source),
            },
        })
    }
}

impl CrashStore for SqliteCrashStore {
    fn crashes_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<CrashRecord>, StoreError> {
        let rows = self.with_deadline("select crashes in bounding box", |connection| {
            let mut statement = connection.prepare_cached(SELECT_IN_BBOX)?;
            let decoded = statement.query_map(
                params![bbox.min().y, bbox.max().y, bbox.min().x, bbox.max().x],
                decode_row,
            )?;
            decoded.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let mut crashes = Vec::with_capacity(rows.len());
        let mut skipped = 0_usize;
        for row in rows {
            match row {
                Ok(crash) => crashes.push(crash),
                Err(MalformedRow { id, reason }) => {
                    skipped += 1;
                    if skipped <= MAX_MALFORMED_WARNINGS {
                        warn!("Skipped malformed crash row {id}: {reason}");
                    }
                }
            }
        }
        if skipped > MAX_MALFORMED_WARNINGS {
            warn!(
                "Skipped {skipped} malformed crash rows; only the first {MAX_MALFORMED_WARNINGS} were reported"
            );
        }

        Ok(crashes)
    }

    fn metric_in_bbox(&self, bbox: &Rect<f64>, metric: Metric) -> Result<u64, StoreError> {
        let (operation, sql) = match metric {
            Metric::Crashes => ("count crashes in bounding box", COUNT_IN_BBOX),
            Metric::Injuries => ("sum injuries in bounding box", SUM_INJURIES_IN_BBOX),
            Metric::Fatalities => ("sum fatalities in bounding box", SUM_FATALITIES_IN_BBOX),
        };
        let total: i64 = self.with_deadline(operation, |connection| {
            let mut statement = connection.prepare_cached(sql)?;
            statement.query_row(
                params![bbox.min().y, bbox.max().y, bbox.min().x, bbox.max().x],
                |row| row.get(0),
            )
        })?;
        u64::try_from(total).map_err(|source| StoreError::Query {
            operation,
            source: Box::new(source),
        })
    }
}

fn decode_row(row: &Row<'_>) -> rusqlite::Result<Result<CrashRecord, MalformedRow>> {
    let id: i64 = row.get(0)?;
    let malformed = |reason| Ok(Err(MalformedRow { id, reason }));

    let Ok(collision_id) = u64::try_from(id) else {
        return malformed("negative collision id");
    };
    let crash_date = match row.get_ref(1)? {
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Null => String::new(),
        ValueRef::Real(_) | ValueRef::Blob(_) => return malformed("unreadable crash date"),
    };
    let (Some(lat), Some(lng)) = (coordinate(row.get_ref(2)?), coordinate(row.get_ref(3)?)) else {
        return malformed("missing or non-numeric coordinates");
    };
    let (Some(injuries), Some(fatalities)) = (count(row.get_ref(4)?), count(row.get_ref(5)?))
    else {
        return malformed("casualty count is not a non-negative 32-bit integer");
    };

    match CrashRecord::new(collision_id, crash_date, geo::Coord { x: lng, y: lat }) {
        Ok(crash) => Ok(Ok(crash.with_casualties(injuries, fatalities))),
        Err(_) => malformed("coordinates out of range"),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integer-typed coordinates are whole degrees well within f64 precision"
)]
fn coordinate(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Real(degrees) => Some(degrees),
        ValueRef::Integer(degrees) => Some(degrees as f64),
        ValueRef::Null | ValueRef::Text(_) | ValueRef::Blob(_) => None,
    }
}

fn count(value: ValueRef<'_>) -> Option<u32> {
    match value {
        ValueRef::Null => Some(0),
        ValueRef::Integer(raw) => u32::try_from(raw).ok(),
        ValueRef::Real(_) | ValueRef::Text(_) | ValueRef::Blob(_) => None,
    }
}
