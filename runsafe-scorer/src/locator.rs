//! Radius search over a crash store.

use log::debug;
use runsafe_core::{CrashStore, CrashTotals, NearbyCrash, SearchArea, distance_km};

use crate::AssessmentError;

/// Crashes found within a search area, with their totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrashReport {
    /// Located crashes in store order.
    pub crashes: Vec<NearbyCrash>,
    /// Totals over `crashes`.
    pub totals: CrashTotals,
}

/// Finds the crashes within a radius of a point.
///
/// The store is queried for the area's bounding box and each candidate is
/// then kept only when its exact distance is within the radius, so the report
/// never contains a crash outside the circle.
///
/// # Examples
/// ```
/// use runsafe_core::{CrashRecord, MemoryCrashStore, SearchArea};
/// use runsafe_scorer::CrashLocator;
///
/// let near = CrashRecord::new(1, "2025-03-01", geo::Coord { x: -73.9855, y: 40.7590 })
///     .expect("valid record")
///     .with_casualties(1, 0);
/// let far = CrashRecord::new(2, "2025-03-01", geo::Coord { x: -73.9000, y: 40.7590 })
///     .expect("valid record");
/// let locator = CrashLocator::new(MemoryCrashStore::with_crashes([near, far]));
///
/// let area = SearchArea::new(40.7580, -73.9855, 0.5).expect("valid area");
/// let report = locator.locate(&area).expect("store is available");
/// assert_eq!(report.totals.crashes, 1);
/// assert_eq!(report.totals.injuries, 1);
/// ```
#[derive(Debug, Clone)]
pub struct CrashLocator<S> {
    store: S,
}

impl<S> CrashLocator<S> {
    /// Create a locator over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: CrashStore> CrashLocator<S> {
    /// Return every crash within `area` together with the per-metric totals.
    ///
    /// An area with no crashes yields an empty report.
    ///
    /// # Errors
    /// Returns [`AssessmentError::StorageUnavailable`] when the store query
    /// fails.
    pub fn locate(&self, area: &SearchArea) -> Result<CrashReport, AssessmentError> {
        let candidates = self.store.crashes_in_bbox(&area.bounding_box())?;
        let candidate_count = candidates.len();

        let mut report = CrashReport::default();
        for record in &candidates {
            let distance = distance_km(area.center(), record.location());
            if distance <= area.radius_km() {
                let nearby = NearbyCrash::from_record(record, distance);
                report.totals.record(&nearby);
                report.crashes.push(nearby);
            }
        }

        debug!(
            "Located {} of {candidate_count} candidate crashes within {} km of ({}, {})",
            report.crashes.len(),
            area.radius_km(),
            area.lat(),
            area.lng()
        );
        Ok(report)
    }
}
