//! Log-scaled safety score from observed totals and baselines.
//!
//! Each metric contributes a penalty `min(max(0, coefficient × ln(max(r, 0.1))), cap)`
//! where `r` is the observed total divided by the baseline. The score is
//! `100` minus the penalties, clamped to `0..=100`. Areas at or below their
//! baseline are not penalised.

use runsafe_core::{CrashTotals, Metric};

use crate::{AssessmentError, Baselines};

/// Ratios below this floor are raised to it before taking the logarithm.
pub const RATIO_FLOOR: f64 = 0.1;

/// Best possible score.
pub const MAX_SCORE: f64 = 100.0;

/// How a metric's penalty grows with its ratio.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MetricPenalty {
    /// Multiplier applied to the log of the ratio.
    pub coefficient: f64,
    /// Largest penalty the metric can contribute.
    pub cap: f64,
}

impl MetricPenalty {
    /// Construct a penalty curve.
    #[must_use]
    pub const fn new(coefficient: f64, cap: f64) -> Self {
        Self { coefficient, cap }
    }

    /// Penalty for `ratio`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "the penalty scales the log of the ratio"
    )]
    pub fn apply(&self, ratio: f64) -> f64 {
        let adjusted = ratio.max(RATIO_FLOOR);
        (self.coefficient * adjusted.ln()).max(0.0).min(self.cap)
    }
}

/// Penalty curves for each metric.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PenaltyWeights {
    /// Crash count penalty.
    pub crashes: MetricPenalty,
    /// Injury penalty.
    pub injuries: MetricPenalty,
    /// Fatality penalty.
    pub fatalities: MetricPenalty,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            crashes: MetricPenalty::new(15.0, 30.0),
            injuries: MetricPenalty::new(20.0, 35.0),
            fatalities: MetricPenalty::new(25.0, 50.0),
        }
    }
}

impl PenaltyWeights {
    /// Penalty curve for a single metric.
    #[must_use]
    pub const fn get(&self, metric: Metric) -> MetricPenalty {
        match metric {
            Metric::Crashes => self.crashes,
            Metric::Injuries => self.injuries,
            Metric::Fatalities => self.fatalities,
        }
    }
}

/// Handling of a zero baseline.
///
/// A zero fatality baseline is always saturated: the ratio becomes the
/// observed fatality count. Zero crash and injury baselines are rejected
/// unless [`ZeroBaselinePolicy::Saturate`] is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroBaselinePolicy {
    /// Fail with [`AssessmentError::DegenerateBaseline`].
    #[default]
    Reject,
    /// Use the observed count as the ratio.
    Saturate,
}

/// Ratios, penalties, and the resulting score.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SafetyBreakdown {
    /// Observed crashes over the crash baseline.
    pub crash_ratio: f64,
    /// Observed injuries over the injury baseline.
    pub injury_ratio: f64,
    /// Observed fatalities over the fatality baseline.
    pub fatality_ratio: f64,
    /// Points deducted for crashes.
    pub crash_penalty: f64,
    /// Points deducted for injuries.
    pub injury_penalty: f64,
    /// Points deducted for fatalities.
    pub fatality_penalty: f64,
    /// Final score in `0..=100`.
    pub score: f64,
}

/// Turns observed totals and baselines into a `0..=100` safety score.
///
/// # Examples
/// ```
/// use runsafe_core::CrashTotals;
/// use runsafe_scorer::{Baselines, SafetyScorer};
///
/// let scorer = SafetyScorer::default();
/// let score = scorer
///     .score(&CrashTotals::new(3, 1, 0), &Baselines::new(2, 1, 0))
///     .expect("baselines are usable");
/// assert!((score - 93.92).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SafetyScorer {
    weights: PenaltyWeights,
    zero_baselines: ZeroBaselinePolicy,
}

impl SafetyScorer {
    /// Scorer with explicit penalty curves and zero-baseline handling.
    #[must_use]
    pub const fn new(weights: PenaltyWeights, zero_baselines: ZeroBaselinePolicy) -> Self {
        Self {
            weights,
            zero_baselines,
        }
    }

    /// Penalty curves in use.
    #[must_use]
    pub const fn weights(&self) -> &PenaltyWeights {
        &self.weights
    }

    /// Zero-baseline handling in use.
    #[must_use]
    pub const fn zero_baselines(&self) -> ZeroBaselinePolicy {
        self.zero_baselines
    }

    /// Score `totals` against `baselines`.
    ///
    /// # Errors
    /// Returns [`AssessmentError::DegenerateBaseline`] when the crash or
    /// injury baseline is zero under [`ZeroBaselinePolicy::Reject`].
    pub fn score(
        &self,
        totals: &CrashTotals,
        baselines: &Baselines,
    ) -> Result<f64, AssessmentError> {
        Ok(self.breakdown(totals, baselines)?.score)
    }

    /// Score `totals` against `baselines`, keeping the intermediate values.
    ///
    /// # Errors
    /// See [`SafetyScorer::score`].
    #[expect(
        clippy::float_arithmetic,
        reason = "penalties are subtracted from the maximum score"
    )]
    pub fn breakdown(
        &self,
        totals: &CrashTotals,
        baselines: &Baselines,
    ) -> Result<SafetyBreakdown, AssessmentError> {
        let crash_ratio = self.ratio(totals, baselines, Metric::Crashes)?;
        let injury_ratio = self.ratio(totals, baselines, Metric::Injuries)?;
        let fatality_ratio = self.ratio(totals, baselines, Metric::Fatalities)?;

        let crash_penalty = self.weights.crashes.apply(crash_ratio);
        let injury_penalty = self.weights.injuries.apply(injury_ratio);
        // No fatalities means no fatality penalty, whatever the floor.
        let fatality_penalty = if totals.fatalities == 0 {
            0.0
        } else {
            self.weights.fatalities.apply(fatality_ratio)
        };

        let score = (MAX_SCORE - crash_penalty - injury_penalty - fatality_penalty)
            .clamp(0.0, MAX_SCORE);
        Ok(SafetyBreakdown {
            crash_ratio,
            injury_ratio,
            fatality_ratio,
            crash_penalty,
            injury_penalty,
            fatality_penalty,
            score,
        })
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "ratios of crash counts are floating-point"
    )]
    fn ratio(
        &self,
        totals: &CrashTotals,
        baselines: &Baselines,
        metric: Metric,
    ) -> Result<f64, AssessmentError> {
        let observed = totals.get(metric) as f64;
        match baselines.get(metric) {
            0 if metric == Metric::Fatalities
                || self.zero_baselines == ZeroBaselinePolicy::Saturate =>
            {
                Ok(observed)
            }
            0 => Err(AssessmentError::DegenerateBaseline { metric }),
            baseline => Ok(observed / baseline as f64),
        }
    }
}
