//! Data access traits for crash records.
//!
//! The `CrashStore` trait defines the read-only query surface the scoring
//! pipeline needs: a range query returning the [`CrashRecord`] values inside a
//! latitude/longitude rectangle, and a range aggregate returning a single
//! [`Metric`] total for the same rectangle.

use std::time::Duration;

use geo::Rect;
use thiserror::Error;

use crate::{CrashRecord, Metric};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryCrashStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{CRASH_TABLE_SCHEMA, SqliteCrashStore, StoreConfig};

/// Boxed error raised by a store backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The crash store could not be reached or a query against it failed.
///
/// Stores never translate failures into empty results, so callers can tell
/// "no crashes here" apart from "the lookup failed".
#[derive(Debug, Error)]
pub enum StoreError {
    /// Acquiring a connection failed, e.g. a missing database or bad
    /// credentials.
    #[error("failed to connect to crash store {target}")]
    Connect {
        /// Connection string or location that was rejected.
        target: String,
        /// Backend error describing the failure.
        #[source]
        source: BackendError,
    },
    /// A query was rejected or failed while running.
    #[error("crash store failed to {operation}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Backend error describing the failure.
        #[source]
        source: BackendError,
    },
    /// A query ran past the configured deadline and was interrupted.
    #[error("crash store query to {operation} exceeded the {deadline:?} deadline")]
    Timeout {
        /// Description of the interrupted operation.
        operation: &'static str,
        /// Configured per-query deadline.
        deadline: Duration,
    },
}

/// Read-only access to persisted crash records.
///
/// The bounding box uses WGS84 coordinates (`x = longitude`, `y = latitude`)
/// and containment includes boundary points. Regions crossing the
/// antimeridian are not modelled.
///
/// # Examples
///
/// ```rust
/// use geo::{Coord, Rect};
/// use runsafe_core::{CrashRecord, CrashStore, MemoryCrashStore, Metric};
///
/// let crash = CrashRecord::new(1, "2025-03-02", Coord { x: 0.0, y: 0.0 })
///     .expect("valid record")
///     .with_casualties(2, 0);
/// let store = MemoryCrashStore::with_crashes([crash.clone()]);
/// let bbox = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
///
/// assert_eq!(store.crashes_in_bbox(&bbox).expect("query"), vec![crash]);
/// assert_eq!(store.metric_in_bbox(&bbox, Metric::Injuries).expect("sum"), 2);
/// ```
pub trait CrashStore {
    /// Return every crash whose coordinates fall within `bbox`.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store is unreachable or the query
    /// fails.
    fn crashes_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<CrashRecord>, StoreError>;

    /// Total `metric` over the crashes within `bbox`.
    ///
    /// The default folds [`CrashStore::crashes_in_bbox`]; backends with a
    /// native aggregate should override it.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store is unreachable or the query
    /// fails.
    fn metric_in_bbox(&self, bbox: &Rect<f64>, metric: Metric) -> Result<u64, StoreError> {
        Ok(self
            .crashes_in_bbox(bbox)?
            .iter()
            .map(|crash| crash.metric_value(metric))
            .fold(0, u64::saturating_add))
    }
}

impl<S> CrashStore for &S
where
    S: CrashStore + ?Sized,
{
    fn crashes_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<CrashRecord>, StoreError> {
        (**self).crashes_in_bbox(bbox)
    }

    fn metric_in_bbox(&self, bbox: &Rect<f64>, metric: Metric) -> Result<u64, StoreError> {
        (**self).metric_in_bbox(bbox, metric)
    }
}
