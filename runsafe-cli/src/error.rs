//! Error types emitted by the RunSafe CLI.

use std::sync::Arc;

use runsafe_core::{SearchAreaError, StoreError};
use runsafe_scorer::{AssessmentError, SampleGridError};
use thiserror::Error;

/// Errors emitted by the RunSafe CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name without dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// The search location or radius was rejected.
    #[error("invalid search area: {0}")]
    InvalidArea(#[from] SearchAreaError),
    /// The baseline sample grid was rejected.
    #[error("invalid baseline grid: {0}")]
    InvalidGrid(#[from] SampleGridError),
    /// Opening the crash database failed.
    #[error("failed to open crash store: {0}")]
    OpenStore(#[from] StoreError),
    /// Locating, baselining, or scoring failed.
    #[error("assessment failed: {0}")]
    Assessment(#[from] AssessmentError),
    /// Serialising the assessment failed.
    #[error("failed to serialise assessment: {0}")]
    SerialiseAssessment(#[source] serde_json::Error),
    /// Writing the assessment failed.
    #[error("failed to write assessment: {0}")]
    WriteOutput(#[source] std::io::Error),
}
