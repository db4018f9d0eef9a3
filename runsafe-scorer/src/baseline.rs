//! Neighbourhood baselines: what is typical for areas around a point.
//!
//! The baseline for a metric is taken over a square grid of sample centres
//! around the query point. Each sample is a box-only aggregate at the query
//! radius; the baseline is the nearest-rank percentile of those samples.

use geo::Coord;
use log::debug;
use runsafe_core::{CrashStore, Metric, SearchArea};
use thiserror::Error;

use crate::AssessmentError;

/// Errors raised while configuring a [`SampleGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleGridError {
    /// The spacing between samples was non-finite, zero, or negative.
    #[error("sample step must be a positive number of degrees, got {step_degrees}")]
    InvalidStep {
        /// Rejected spacing.
        step_degrees: f64,
    },
    /// The percentile was outside `0..=1`.
    #[error("baseline percentile must lie within 0..=1, got {percentile}")]
    InvalidPercentile {
        /// Rejected percentile.
        percentile: f64,
    },
    /// The grid would contain no samples.
    #[error("sample grid contains no samples")]
    Empty,
}

/// Sample centres and ranking used to derive a baseline.
///
/// The default grid is 5×5 with 0.01° spacing, includes the query point, and
/// ranks samples at the median.
///
/// # Examples
/// ```
/// use runsafe_scorer::SampleGrid;
///
/// let grid = SampleGrid::default();
/// assert_eq!(grid.len(), 25);
/// assert_eq!(grid.rank_index(), 12);
///
/// let ring = grid.excluding_center().expect("grid still has samples");
/// assert_eq!(ring.len(), 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    half_width: u8,
    step_degrees: f64,
    include_center: bool,
    percentile: f64,
}

impl Default for SampleGrid {
    fn default() -> Self {
        Self {
            half_width: Self::DEFAULT_HALF_WIDTH,
            step_degrees: Self::DEFAULT_STEP_DEGREES,
            include_center: true,
            percentile: Self::DEFAULT_PERCENTILE,
        }
    }
}

impl SampleGrid {
    /// Offsets run from `-2` to `2` steps on each axis.
    pub const DEFAULT_HALF_WIDTH: u8 = 2;
    /// Roughly 1.1 km of latitude between neighbouring samples.
    pub const DEFAULT_STEP_DEGREES: f64 = 0.01;
    /// Median.
    pub const DEFAULT_PERCENTILE: f64 = 0.5;

    /// A `(2k+1)×(2k+1)` grid with `k = half_width`, spaced `step_degrees`
    /// apart, including the query point and ranked at the median.
    ///
    /// # Errors
    /// Returns [`SampleGridError::InvalidStep`] when the spacing is not a
    /// positive finite number.
    pub fn new(half_width: u8, step_degrees: f64) -> Result<Self, SampleGridError> {
        if !step_degrees.is_finite() || step_degrees <= 0.0 {
            return Err(SampleGridError::InvalidStep { step_degrees });
        }
        Ok(Self {
            half_width,
            step_degrees,
            ..Self::default()
        })
    }

    /// Choose whether the query point itself is sampled.
    ///
    /// # Errors
    /// Returns [`SampleGridError::Empty`] when excluding the centre of a
    /// single-point grid.
    pub const fn with_center(mut self, include: bool) -> Result<Self, SampleGridError> {
        if !include && self.half_width == 0 {
            return Err(SampleGridError::Empty);
        }
        self.include_center = include;
        Ok(self)
    }

    /// Drop the query point from the samples.
    ///
    /// # Errors
    /// See [`SampleGrid::with_center`].
    pub const fn excluding_center(self) -> Result<Self, SampleGridError> {
        self.with_center(false)
    }

    /// Rank samples at `percentile` instead of the median.
    ///
    /// # Errors
    /// Returns [`SampleGridError::InvalidPercentile`] outside `0..=1`.
    pub fn with_percentile(mut self, percentile: f64) -> Result<Self, SampleGridError> {
        if !(0.0..=1.0).contains(&percentile) {
            return Err(SampleGridError::InvalidPercentile { percentile });
        }
        self.percentile = percentile;
        Ok(self)
    }

    /// Number of offsets from the centre on each side.
    #[must_use]
    pub const fn half_width(&self) -> u8 {
        self.half_width
    }

    /// Spacing between neighbouring samples in degrees.
    #[must_use]
    pub const fn step_degrees(&self) -> f64 {
        self.step_degrees
    }

    /// Whether the query point is one of the samples.
    #[must_use]
    pub const fn includes_center(&self) -> bool {
        self.include_center
    }

    /// Percentile used to rank samples.
    #[must_use]
    pub const fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Number of samples taken per metric.
    #[must_use]
    pub fn len(&self) -> usize {
        let side = usize::from(self.half_width) * 2 + 1;
        let all = side * side;
        if self.include_center { all } else { all - 1 }
    }

    /// Always `false`; construction rejects empty grids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the baseline within the sorted samples.
    #[must_use]
    pub fn rank_index(&self) -> usize {
        rank_index(self.len(), self.percentile)
    }

    /// Sample centres around `origin`, row by row from the south-west corner.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "sample centres are offset from the origin in degrees"
    )]
    pub fn centres(&self, origin: Coord<f64>) -> Vec<Coord<f64>> {
        let reach = i16::from(self.half_width);
        let mut centres = Vec::with_capacity(self.len());
        for lat_step in -reach..=reach {
            for lng_step in -reach..=reach {
                if !self.include_center && lat_step == 0 && lng_step == 0 {
                    continue;
                }
                centres.push(Coord {
                    x: origin.x + f64::from(lng_step) * self.step_degrees,
                    y: origin.y + f64::from(lat_step) * self.step_degrees,
                });
            }
        }
        centres
    }
}

/// Nearest-rank index `floor(percentile × len)`, clamped to the last element.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "sample counts are small and the percentile is within 0..=1"
)]
fn rank_index(len: usize, percentile: f64) -> usize {
    let rank = (percentile * len as f64).floor() as usize;
    rank.min(len.saturating_sub(1))
}

/// Sort `samples` and return the nearest-rank `percentile` element.
///
/// Returns `None` for an empty slice.
///
/// # Examples
/// ```
/// use runsafe_scorer::nearest_rank;
///
/// let mut samples = vec![5, 1, 4, 2, 3];
/// assert_eq!(nearest_rank(&mut samples, 0.5), Some(3));
/// assert_eq!(nearest_rank(&mut samples, 1.0), Some(5));
/// assert_eq!(nearest_rank(&mut [], 0.5), None);
/// ```
#[must_use]
pub fn nearest_rank(samples: &mut [u64], percentile: f64) -> Option<u64> {
    samples.sort_unstable();
    samples.get(rank_index(samples.len(), percentile)).copied()
}

/// Baselines for all three metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct Baselines {
    /// Typical crash count.
    pub crashes: u64,
    /// Typical injury count.
    pub injuries: u64,
    /// Typical fatality count.
    pub fatalities: u64,
}

impl Baselines {
    /// Construct baselines from explicit values.
    #[must_use]
    pub const fn new(crashes: u64, injuries: u64, fatalities: u64) -> Self {
        Self {
            crashes,
            injuries,
            fatalities,
        }
    }

    /// Baseline for a single metric.
    #[must_use]
    pub const fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Crashes => self.crashes,
            Metric::Injuries => self.injuries,
            Metric::Fatalities => self.fatalities,
        }
    }
}

/// Computes neighbourhood baselines from a crash store.
#[derive(Debug, Clone)]
pub struct BaselineEstimator<S> {
    store: S,
    grid: SampleGrid,
}

impl<S> BaselineEstimator<S> {
    /// Sample `store` over `grid`.
    pub const fn new(store: S, grid: SampleGrid) -> Self {
        Self { store, grid }
    }

    /// Grid used for sampling.
    pub const fn grid(&self) -> &SampleGrid {
        &self.grid
    }
}

impl<S: CrashStore> BaselineEstimator<S> {
    /// Typical value of `metric` for areas the size of `area` around it.
    ///
    /// Every sample must succeed before the percentile is taken.
    ///
    /// # Errors
    /// Returns [`AssessmentError::StorageUnavailable`] when any sample query
    /// fails.
    pub fn baseline(&self, area: &SearchArea, metric: Metric) -> Result<u64, AssessmentError> {
        let mut samples = self
            .grid
            .centres(area.center())
            .into_iter()
            .map(|centre| {
                let sample = area.recentred(centre);
                self.store.metric_in_bbox(&sample.bounding_box(), metric)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let baseline =
            nearest_rank(&mut samples, self.grid.percentile).ok_or(SampleGridError::Empty)?;
        debug!(
            "{metric} baseline {baseline} from {} samples around ({}, {})",
            samples.len(),
            area.lat(),
            area.lng()
        );
        Ok(baseline)
    }

    /// Baselines for crashes, injuries, and fatalities.
    ///
    /// # Errors
    /// See [`BaselineEstimator::baseline`].
    pub fn baselines(&self, area: &SearchArea) -> Result<Baselines, AssessmentError> {
        Ok(Baselines {
            crashes: self.baseline(area, Metric::Crashes)?,
            injuries: self.baseline(area, Metric::Injuries)?,
            fatalities: self.baseline(area, Metric::Fatalities)?,
        })
    }
}
