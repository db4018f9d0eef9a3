//! Core domain types for the RunSafe crash-safety engine.
//!
//! The crate models persisted [`CrashRecord`] values, the geometry used to
//! find them around a point, and the read-only [`CrashStore`] interface the
//! scoring pipeline queries. Coordinates are WGS84 with `x = longitude` and
//! `y = latitude`, matching the `geo` crate conventions.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod area;
pub mod crash;
pub mod geometry;
pub mod metric;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use area::{SearchArea, SearchAreaError};
pub use crash::{CrashRecord, CrashRecordError, CrashTotals, NearbyCrash};
pub use geometry::{KM_PER_DEGREE, bounding_box, distance_km};
pub use metric::Metric;
pub use store::{CrashStore, MemoryCrashStore, StoreError};

#[cfg(feature = "store-sqlite")]
pub use store::{CRASH_TABLE_SCHEMA, SqliteCrashStore, StoreConfig};
