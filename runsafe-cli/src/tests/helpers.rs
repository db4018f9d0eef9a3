//! Test helpers for building crash datasets and store openers.

use std::path::Path;

use runsafe_core::{
    CrashRecord, CrashStore, MemoryCrashStore, StoreConfig,
    test_support::{FailingStore, crash, write_crash_database},
};

use crate::{CliError, assess::StoreOpener};

/// Uniform 41×41 grid of crashes centred on Times Square, 0.002° apart.
pub(super) fn times_square_grid() -> Vec<CrashRecord> {
    (0_u32..41)
        .flat_map(|row| {
            (0_u32..41).map(move |col| {
                let id = u64::from(row * 41 + col);
                let injuries = u32::from(id % 3 == 0);
                crash(
                    id,
                    -74.0255 + f64::from(col) * 0.002,
                    40.718 + f64::from(row) * 0.002,
                )
                .with_casualties(injuries, 0)
            })
        })
        .collect()
}

/// Persist `crashes` to `dir/crashes.db`, returning the connection string.
pub(super) fn write_dataset(dir: &Path, crashes: &[CrashRecord]) -> String {
    let path = dir.join("crashes.db");
    write_crash_database(&path, crashes).expect("persist crashes");
    path.to_string_lossy().into_owned()
}

/// Serves a fixed set of crashes from memory, ignoring the connection string.
pub(super) struct MemoryOpener(pub(super) Vec<CrashRecord>);

impl StoreOpener for MemoryOpener {
    fn open(&self, _config: &StoreConfig) -> Result<Box<dyn CrashStore>, CliError> {
        Ok(Box::new(MemoryCrashStore::with_crashes(self.0.iter().cloned())))
    }
}

/// Opens a store whose every query fails.
pub(super) struct UnreachableOpener;

impl StoreOpener for UnreachableOpener {
    fn open(&self, _config: &StoreConfig) -> Result<Box<dyn CrashStore>, CliError> {
        Ok(Box::new(FailingStore))
    }
}
