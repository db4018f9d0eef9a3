//! Crash-safety scoring for RunSafe search areas.
//!
//! An assessment runs three steps against one [`CrashStore`](runsafe_core::CrashStore):
//! - [`CrashLocator`] finds the crashes within the search radius and totals
//!   them.
//! - [`BaselineEstimator`] samples a grid of neighbouring areas and takes a
//!   percentile of each metric as the typical value.
//! - [`SafetyScorer`] compares the totals with the baselines and maps the
//!   ratios onto a `0..=100` score.
//!
//! [`SafetyAssessor`] wires the steps together.
//!
//! # Examples
//!
//! ```no_run
//! use runsafe_core::{SearchArea, SqliteCrashStore, StoreConfig};
//! use runsafe_scorer::SafetyAssessor;
//!
//! let store = SqliteCrashStore::open(StoreConfig::new("crashes.db")).expect("open store");
//! let area = SearchArea::new(40.7580, -73.9855, 0.5).expect("valid area");
//! let assessment = SafetyAssessor::new(store).assess(&area).expect("assess");
//! println!("{}", assessment.safety);
//! ```

#![forbid(unsafe_code)]

mod assessment;
mod baseline;
mod error;
mod locator;
mod safety;

pub use assessment::{CrashSummary, SafetyAssessment, SafetyAssessor, SearchLocation};
pub use baseline::{BaselineEstimator, Baselines, SampleGrid, SampleGridError, nearest_rank};
pub use error::AssessmentError;
pub use locator::{CrashLocator, CrashReport};
pub use safety::{
    MAX_SCORE, MetricPenalty, PenaltyWeights, RATIO_FLOOR, SafetyBreakdown, SafetyScorer,
    ZeroBaselinePolicy,
};
