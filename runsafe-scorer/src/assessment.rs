//! End-to-end safety assessment of a search area.

use log::{debug, info};
use runsafe_core::{CrashStore, CrashTotals, NearbyCrash, SearchArea};
use serde::Serialize;

use crate::{
    AssessmentError, BaselineEstimator, Baselines, CrashLocator, SafetyBreakdown, SafetyScorer,
    SampleGrid,
};

/// Centre of an assessed area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchLocation {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// Totals reported for an assessed area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrashSummary {
    /// Crashes within the radius.
    pub total_crashes: u64,
    /// Persons injured in those crashes.
    pub total_injuries: u64,
    /// Persons killed in those crashes.
    pub total_fatalities: u64,
}

impl From<CrashTotals> for CrashSummary {
    fn from(totals: CrashTotals) -> Self {
        Self {
            total_crashes: totals.crashes,
            total_injuries: totals.injuries,
            total_fatalities: totals.fatalities,
        }
    }
}

/// Result of assessing one area.
///
/// Serialises to the caller-facing shape: `search_location`,
/// `search_radius_km`, `summary`, and `safety`. The located crashes,
/// baselines, and score breakdown are kept for callers but not serialised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyAssessment {
    /// Centre of the area.
    pub search_location: SearchLocation,
    /// Radius of the area in kilometres.
    pub search_radius_km: f64,
    /// Totals over the located crashes.
    pub summary: CrashSummary,
    /// Score in `0..=100`; higher is safer.
    pub safety: f64,
    /// Crashes within the radius.
    #[serde(skip)]
    pub crashes: Vec<NearbyCrash>,
    /// Neighbourhood baselines the totals were compared with.
    #[serde(skip)]
    pub baselines: Baselines,
    /// Ratios and penalties behind `safety`.
    #[serde(skip)]
    pub breakdown: SafetyBreakdown,
}

/// Locates, baselines, and scores areas against a single crash store.
///
/// # Examples
/// ```
/// use runsafe_core::{MemoryCrashStore, SearchArea};
/// use runsafe_scorer::{AssessmentError, SafetyAssessor};
///
/// let assessor = SafetyAssessor::new(MemoryCrashStore::default());
/// let area = SearchArea::new(40.7580, -73.9855, 0.5).expect("valid area");
///
/// // An empty store has no crash baseline to compare with.
/// assert!(matches!(
///     assessor.assess(&area),
///     Err(AssessmentError::DegenerateBaseline { .. })
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct SafetyAssessor<S> {
    store: S,
    grid: SampleGrid,
    scorer: SafetyScorer,
}

impl<S> SafetyAssessor<S> {
    /// Assessor over `store` with the default grid and scorer.
    pub fn new(store: S) -> Self {
        Self {
            store,
            grid: SampleGrid::default(),
            scorer: SafetyScorer::default(),
        }
    }

    /// Use `grid` for baselines.
    #[must_use]
    #[expect(
        clippy::missing_const_for_fn,
        reason = "the store type is generic and may need dropping"
    )]
    pub fn with_grid(mut self, grid: SampleGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Use `scorer` for the final score.
    #[must_use]
    #[expect(
        clippy::missing_const_for_fn,
        reason = "the store type is generic and may need dropping"
    )]
    pub fn with_scorer(mut self, scorer: SafetyScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Release the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: CrashStore> SafetyAssessor<S> {
    /// Locate the crashes in `area`, compare them with the neighbourhood
    /// baselines, and score the result.
    ///
    /// # Errors
    /// Returns [`AssessmentError::StorageUnavailable`] when any store query
    /// fails and [`AssessmentError::DegenerateBaseline`] when a baseline
    /// cannot be divided by.
    pub fn assess(&self, area: &SearchArea) -> Result<SafetyAssessment, AssessmentError> {
        let report = CrashLocator::new(&self.store).locate(area)?;
        debug!(
            "Observed {} crashes, {} injuries, {} fatalities",
            report.totals.crashes, report.totals.injuries, report.totals.fatalities
        );

        let baselines = BaselineEstimator::new(&self.store, self.grid).baselines(area)?;
        debug!(
            "Baselines: {} crashes, {} injuries, {} fatalities",
            baselines.crashes, baselines.injuries, baselines.fatalities
        );

        let breakdown = self.scorer.breakdown(&report.totals, &baselines)?;
        info!(
            "Safety score {:.1} for ({}, {}) within {} km",
            breakdown.score,
            area.lat(),
            area.lng(),
            area.radius_km()
        );

        Ok(SafetyAssessment {
            search_location: SearchLocation {
                lat: area.lat(),
                lng: area.lng(),
            },
            search_radius_km: area.radius_km(),
            summary: report.totals.into(),
            safety: breakdown.score,
            crashes: report.crashes,
            baselines,
            breakdown,
        })
    }
}
