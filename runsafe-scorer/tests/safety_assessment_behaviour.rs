//! Behavioural tests for `SafetyAssessor` using rstest-bdd.

use std::cell::RefCell;

use geo::Rect;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use runsafe_core::{
    CrashRecord, CrashStore, MemoryCrashStore, Metric, SearchArea, SqliteCrashStore, StoreConfig,
    StoreError,
    test_support::{FailingStore, crash, write_crash_database},
};
use runsafe_scorer::{AssessmentError, Baselines, SafetyAssessment, SafetyAssessor};
use tempfile::TempDir;

/// Serves located crashes from memory and a fixed value for every aggregate.
struct FlatBaselineStore {
    crashes: MemoryCrashStore,
    baselines: Baselines,
}

impl CrashStore for FlatBaselineStore {
    fn crashes_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<CrashRecord>, StoreError> {
        self.crashes.crashes_in_bbox(bbox)
    }

    fn metric_in_bbox(&self, _bbox: &Rect<f64>, metric: Metric) -> Result<u64, StoreError> {
        Ok(self.baselines.get(metric))
    }
}

struct AssessmentWorld {
    temp_dir: TempDir,
    store: RefCell<Option<Box<dyn CrashStore>>>,
    dataset: RefCell<Vec<CrashRecord>>,
    outcome: RefCell<Option<Result<SafetyAssessment, AssessmentError>>>,
}

impl AssessmentWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            store: RefCell::new(None),
            dataset: RefCell::new(Vec::new()),
            outcome: RefCell::new(None),
        }
    }

    fn expect_assessment(&self) -> SafetyAssessment {
        match self.outcome.borrow().as_ref() {
            Some(Ok(assessment)) => assessment.clone(),
            Some(Err(err)) => panic!("assessment failed: {err}"),
            None => panic!("no assessment was run"),
        }
    }
}

#[fixture]
fn world() -> AssessmentWorld {
    AssessmentWorld::new()
}

fn times_square() -> SearchArea {
    SearchArea::new(40.758, -73.9855, 0.5).expect("valid area")
}

fn times_square_crashes() -> Vec<CrashRecord> {
    vec![
        crash(1, -73.9855, 40.7590).with_casualties(1, 0),
        crash(2, -73.9840, 40.7575),
        crash(3, -73.9870, 40.7600),
    ]
}

fn use_flat_baselines(world: &AssessmentWorld, baselines: Baselines) {
    let store = FlatBaselineStore {
        crashes: MemoryCrashStore::with_crashes(times_square_crashes()),
        baselines,
    };
    world.store.replace(Some(Box::new(store)));
}

#[given("three crashes near Times Square with baselines of two crashes and one injury")]
fn given_busy_corner(world: &AssessmentWorld) {
    use_flat_baselines(world, Baselines::new(2, 1, 0));
}

#[given("three crashes near Times Square with a zero crash baseline")]
fn given_zero_crash_baseline(world: &AssessmentWorld) {
    use_flat_baselines(world, Baselines::new(0, 1, 0));
}

#[given("three crashes near Times Square with baselines equal to the totals")]
fn given_equal_baselines(world: &AssessmentWorld) {
    use_flat_baselines(world, Baselines::new(3, 1, 0));
}

#[given("an unreachable crash store")]
fn given_unreachable_store(world: &AssessmentWorld) {
    world.store.replace(Some(Box::new(FailingStore)));
}

#[given("a uniform grid of crashes around Times Square stored on disk")]
fn given_sqlite_grid(world: &AssessmentWorld) {
    let crashes: Vec<_> = (0_u32..41)
        .flat_map(|row| {
            (0_u32..41).map(move |col| {
                let id = u64::from(row * 41 + col);
                let injuries = u32::from(id % 2 == 0);
                crash(
                    id,
                    -74.0255 + f64::from(col) * 0.002,
                    40.718 + f64::from(row) * 0.002,
                )
                .with_casualties(injuries, 0)
            })
        })
        .collect();
    let db_path = world.temp_dir.path().join("crashes.db");
    write_crash_database(&db_path, &crashes).expect("persist crashes");
    let store = SqliteCrashStore::open(StoreConfig::new(db_path.to_string_lossy()))
        .expect("open store");
    world.store.replace(Some(Box::new(store)));
    world.dataset.replace(crashes);
}

#[when("I assess Times Square within half a kilometre")]
fn when_assess(world: &AssessmentWorld) {
    let outcome = {
        let borrowed = world.store.borrow();
        let store = borrowed.as_deref().expect("store should be configured");
        SafetyAssessor::new(store).assess(&times_square())
    };
    world.outcome.replace(Some(outcome));
}

#[then("the summary reports three crashes and one injury")]
fn then_summary(world: &AssessmentWorld) {
    let summary = world.expect_assessment().summary;
    assert_eq!(summary.total_crashes, 3);
    assert_eq!(summary.total_injuries, 1);
    assert_eq!(summary.total_fatalities, 0);
}

#[then("the safety score is about 93.9")]
fn then_busy_score(world: &AssessmentWorld) {
    let safety = world.expect_assessment().safety;
    assert!((safety - 93.9).abs() < 0.05, "unexpected score {safety}");
}

#[then("the safety score is 100")]
fn then_full_marks(world: &AssessmentWorld) {
    assert_eq!(world.expect_assessment().safety, 100.0);
}

#[then("the assessment fails with a degenerate crash baseline")]
fn then_degenerate(world: &AssessmentWorld) {
    let binding = world.outcome.borrow();
    assert!(matches!(
        binding.as_ref(),
        Some(Err(AssessmentError::DegenerateBaseline {
            metric: Metric::Crashes
        }))
    ));
}

#[then("the assessment fails because storage is unavailable")]
fn then_storage_unavailable(world: &AssessmentWorld) {
    let binding = world.outcome.borrow();
    assert!(matches!(
        binding.as_ref(),
        Some(Err(AssessmentError::StorageUnavailable(_)))
    ));
}

#[then("the in-memory store produces the same assessment")]
fn then_memory_matches(world: &AssessmentWorld) {
    let from_sqlite = world.expect_assessment();
    let memory = MemoryCrashStore::with_crashes(world.dataset.borrow().iter().cloned());
    let from_memory = SafetyAssessor::new(memory)
        .assess(&times_square())
        .expect("assess");

    assert!(from_sqlite.summary.total_crashes > 0);
    assert_eq!(from_sqlite.summary, from_memory.summary);
    assert_eq!(from_sqlite.baselines, from_memory.baselines);
    assert_eq!(from_sqlite.safety, from_memory.safety);
}

#[scenario(path = "tests/features/safety_assessment.feature", index = 0)]
fn busy_corner(world: AssessmentWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/safety_assessment.feature", index = 1)]
fn zero_crash_baseline(world: AssessmentWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/safety_assessment.feature", index = 2)]
fn equal_baselines(world: AssessmentWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/safety_assessment.feature", index = 3)]
fn unreachable_store(world: AssessmentWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/safety_assessment.feature", index = 4)]
fn sqlite_matches_memory(world: AssessmentWorld) {
    let _ = world;
}
