//! Error types raised while assessing a search area.

use runsafe_core::{Metric, SearchAreaError, StoreError};
use thiserror::Error;

use crate::baseline::SampleGridError;

/// Errors raised by the locate, baseline, and scoring steps.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// The crash store could not be reached or a query failed.
    #[error("crash store unavailable")]
    StorageUnavailable(#[from] StoreError),
    /// A crash or injury baseline was zero, so the ratio is undefined.
    #[error("{metric} baseline is zero; refusing to divide by it")]
    DegenerateBaseline {
        /// Metric whose baseline was zero.
        metric: Metric,
    },
    /// The requested search area was rejected.
    #[error("invalid search area")]
    InvalidArea(#[from] SearchAreaError),
    /// The baseline sample grid was rejected.
    #[error("invalid baseline sample grid")]
    InvalidGrid(#[from] SampleGridError),
}
