//! In-memory crash store backed by an R\*-tree.

use std::collections::HashSet;

use geo::Rect;
use rstar::{AABB, RTree, RTreeObject};

use crate::CrashRecord;

use super::{CrashStore, StoreError};

impl RTreeObject for CrashRecord {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let location = self.location();
        AABB::from_point([location.x, location.y])
    }
}

/// Crash store holding every record in an R\*-tree.
///
/// Useful for tests and for callers that already hold a snapshot of crash
/// data in memory. Queries never fail. Records are deduplicated by
/// identifier; the first record seen for an identifier wins.
#[derive(Debug, Default)]
pub struct MemoryCrashStore {
    index: RTree<CrashRecord>,
    ids: HashSet<u64>,
}

impl MemoryCrashStore {
    /// Build a store from a collection of crash records.
    pub fn with_crashes<I>(crashes: I) -> Self
    where
        I: IntoIterator<Item = CrashRecord>,
    {
        let mut ids = HashSet::new();
        let unique: Vec<_> = crashes
            .into_iter()
            .filter(|crash| ids.insert(crash.id()))
            .collect();
        Self {
            index: RTree::bulk_load(unique),
            ids,
        }
    }

    /// Insert a record, returning `false` when its identifier is already
    /// present.
    pub fn insert(&mut self, crash: CrashRecord) -> bool {
        if !self.ids.insert(crash.id()) {
            return false;
        }
        self.index.insert(crash);
        true
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.size()
    }

    /// Report whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.size() == 0
    }
}

impl CrashStore for MemoryCrashStore {
    fn crashes_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<CrashRecord>, StoreError> {
        let envelope =
            AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
        let mut crashes: Vec<_> = self
            .index
            .locate_in_envelope_intersecting(&envelope)
            .cloned()
            .collect();
        crashes.sort_unstable_by_key(CrashRecord::id);
        Ok(crashes)
    }
}
