//! Facade crate for the RunSafe crash-safety engine.
//!
//! This crate re-exports the core domain types and the assessment pipeline,
//! with the SQLite crash store behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use runsafe_core::{
    CrashRecord, CrashStore, CrashTotals, MemoryCrashStore, Metric, NearbyCrash, SearchArea,
    SearchAreaError, StoreError, bounding_box, distance_km,
};

#[cfg(feature = "store-sqlite")]
pub use runsafe_core::{CRASH_TABLE_SCHEMA, SqliteCrashStore, StoreConfig};

pub use runsafe_scorer::{
    AssessmentError, BaselineEstimator, Baselines, CrashLocator, CrashReport, PenaltyWeights,
    SafetyAssessment, SafetyAssessor, SafetyScorer, SampleGrid, ZeroBaselinePolicy,
};

#[cfg(feature = "test-support")]
pub use runsafe_core::test_support;
