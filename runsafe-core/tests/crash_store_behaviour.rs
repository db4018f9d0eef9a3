//! Behavioural tests for the crash stores using rstest-bdd.

use std::{cell::RefCell, path::PathBuf};

use geo::{Coord, Rect};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use runsafe_core::{
    CrashRecord, CrashStore, MemoryCrashStore, Metric, SqliteCrashStore, StoreConfig, StoreError,
    test_support::{crash, write_crash_database},
};
use tempfile::TempDir;

/// Shared state for crash store scenarios.
#[derive(Debug)]
struct CrashStoreWorld {
    temp_dir: TempDir,
    db_path: RefCell<Option<PathBuf>>,
    dataset: RefCell<Vec<CrashRecord>>,
    store: RefCell<Option<SqliteCrashStore>>,
    store_error: RefCell<Option<StoreError>>,
    query_results: RefCell<Vec<CrashRecord>>,
    injury_total: RefCell<Option<u64>>,
}

impl CrashStoreWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            db_path: RefCell::new(None),
            dataset: RefCell::new(Vec::new()),
            store: RefCell::new(None),
            store_error: RefCell::new(None),
            query_results: RefCell::new(Vec::new()),
            injury_total: RefCell::new(None),
        }
    }

    fn expect_db_path(&self) -> PathBuf {
        self.db_path
            .borrow()
            .clone()
            .expect("database path should be initialised before opening the store")
    }

    fn with_store<T>(&self, query: impl FnOnce(&SqliteCrashStore) -> T) -> T {
        assert!(self.store_error.borrow().is_none(), "unexpected store error");
        let borrowed = self.store.borrow();
        let store = borrowed.as_ref().expect("store should be open");
        query(store)
    }
}

#[fixture]
fn world() -> CrashStoreWorld {
    CrashStoreWorld::new()
}

fn origin_box() -> Rect<f64> {
    Rect::new(Coord { x: -0.5, y: -0.5 }, Coord { x: 0.5, y: 0.5 })
}

#[given("a SQLite crash database with crashes near the origin")]
fn given_dataset(world: &CrashStoreWorld) {
    let crashes = vec![
        crash(20, 0.4, 0.4).with_casualties(2, 0),
        crash(10, -0.2, -0.2).with_casualties(1, 1),
        crash(30, 2.0, 2.0).with_casualties(7, 0),
    ];
    let db_path = world.temp_dir.path().join("crashes.db");
    write_crash_database(&db_path, &crashes).expect("persist crashes");
    world.db_path.replace(Some(db_path));
    world.dataset.replace(crashes);
}

#[given("no crash database on disk")]
fn given_missing_database(world: &CrashStoreWorld) {
    world
        .db_path
        .replace(Some(world.temp_dir.path().join("absent.db")));
}

#[when("I open the SQLite crash store")]
fn open_store(world: &CrashStoreWorld) {
    let path = world.expect_db_path();
    match SqliteCrashStore::open(StoreConfig::new(path.to_string_lossy())) {
        Ok(store) => {
            world.store.replace(Some(store));
            world.store_error.replace(None);
        }
        Err(err) => {
            world.store.replace(None);
            world.store_error.replace(Some(err));
        }
    }
}

#[when("I query the bounding box around the origin")]
fn query_origin(world: &CrashStoreWorld) {
    let results = world.with_store(|store| store.crashes_in_bbox(&origin_box()).expect("query"));
    world.query_results.replace(results);
}

#[when("I sum injuries in the bounding box around the origin")]
fn sum_injuries(world: &CrashStoreWorld) {
    let total = world.with_store(|store| {
        store
            .metric_in_bbox(&origin_box(), Metric::Injuries)
            .expect("aggregate")
    });
    world.injury_total.replace(Some(total));
}

#[then("exactly two crashes are returned in identifier order")]
fn then_two_results(world: &CrashStoreWorld) {
    let ids: Vec<_> = world
        .query_results
        .borrow()
        .iter()
        .map(CrashRecord::id)
        .collect();
    assert_eq!(ids, vec![10, 20]);
}

#[then("the injury total is three")]
fn then_injury_total(world: &CrashStoreWorld) {
    assert_eq!(*world.injury_total.borrow(), Some(3));
}

#[then("opening the store fails with a connection error")]
fn then_connect_error(world: &CrashStoreWorld) {
    let binding = world.store_error.borrow();
    let error = binding.as_ref().expect("an error should be recorded");
    assert!(matches!(error, StoreError::Connect { .. }));
}

#[then("the memory store returns the same crashes")]
fn then_memory_matches(world: &CrashStoreWorld) {
    let memory = MemoryCrashStore::with_crashes(world.dataset.borrow().iter().cloned());
    let from_memory = memory.crashes_in_bbox(&origin_box()).expect("query");
    assert_eq!(from_memory, *world.query_results.borrow());
}

#[scenario(path = "tests/features/crash_store.feature", index = 0)]
fn crashes_returned(world: CrashStoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/crash_store.feature", index = 1)]
fn injuries_summed(world: CrashStoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/crash_store.feature", index = 2)]
fn missing_database(world: CrashStoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/crash_store.feature", index = 3)]
fn memory_matches_sqlite(world: CrashStoreWorld) {
    let _ = world;
}
