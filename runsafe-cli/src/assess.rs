//! Assess command implementation for the RunSafe CLI.

use std::{io::Write, time::Duration};

use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use runsafe_core::{CrashStore, SearchArea, SqliteCrashStore, StoreConfig};
use runsafe_scorer::{
    PenaltyWeights, SafetyAssessment, SafetyAssessor, SafetyScorer, SampleGrid, ZeroBaselinePolicy,
};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_LAT, ARG_LNG, ARG_QUERY_TIMEOUT_MS, ARG_RADIUS_KM, CliError,
    DEFAULT_RADIUS_KM, ENV_DATABASE, ENV_LAT, ENV_LNG,
};

/// CLI arguments for the `assess` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Locate the crashes within a radius of a point, compare them \
                 with the surrounding neighbourhood, and print a 0-100 safety \
                 score as JSON. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Score the crash safety of an area"
)]
#[ortho_config(prefix = "RUNSAFE")]
pub(crate) struct AssessArgs {
    /// Latitude of the search centre in degrees.
    #[arg(long = ARG_LAT, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the search centre in degrees.
    #[arg(long = ARG_LNG, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Search radius in kilometres (default 0.5).
    #[arg(long = ARG_RADIUS_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
    /// SQLite path or `file:` URI of the crash database.
    #[arg(long = ARG_DATABASE, value_name = "connection")]
    #[serde(default)]
    pub(crate) database: Option<String>,
    /// Per-query deadline in milliseconds.
    #[arg(long = ARG_QUERY_TIMEOUT_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) query_timeout_ms: Option<u64>,
    /// Leave the search centre out of the baseline samples.
    #[arg(long)]
    #[serde(default)]
    pub(crate) exclude_center: bool,
    /// Score zero crash or injury baselines instead of failing.
    #[arg(long)]
    #[serde(default)]
    pub(crate) saturate_zero_baselines: bool,
}

impl AssessArgs {
    pub(crate) fn into_config(self) -> Result<AssessConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AssessConfig::try_from(merged)
    }
}

/// Resolved `assess` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AssessConfig {
    /// Area to assess.
    pub(crate) area: SearchArea,
    /// Crash database connection settings.
    pub(crate) store: StoreConfig,
    /// Baseline sampling.
    pub(crate) grid: SampleGrid,
    /// Zero-baseline handling.
    pub(crate) zero_baselines: ZeroBaselinePolicy,
}

impl TryFrom<AssessArgs> for AssessConfig {
    type Error = CliError;

    fn try_from(args: AssessArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_LNG,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DATABASE,
        })?;

        let area = SearchArea::new(lat, lng, args.radius_km.unwrap_or(DEFAULT_RADIUS_KM))?;
        let mut store = StoreConfig::new(database);
        if let Some(ms) = args.query_timeout_ms {
            store = store.with_query_timeout(Duration::from_millis(ms));
        }
        let grid = SampleGrid::default().with_center(!args.exclude_center)?;
        let zero_baselines = if args.saturate_zero_baselines {
            ZeroBaselinePolicy::Saturate
        } else {
            ZeroBaselinePolicy::Reject
        };

        Ok(Self {
            area,
            store,
            grid,
            zero_baselines,
        })
    }
}

/// Opens the crash store for an assessment.
pub(crate) trait StoreOpener {
    fn open(&self, config: &StoreConfig) -> Result<Box<dyn CrashStore>, CliError>;
}

pub(crate) struct SqliteStoreOpener;

impl StoreOpener for SqliteStoreOpener {
    fn open(&self, config: &StoreConfig) -> Result<Box<dyn CrashStore>, CliError> {
        Ok(Box::new(SqliteCrashStore::open(config.clone())?))
    }
}

pub(crate) fn run_assess(
    args: AssessArgs,
    opener: &dyn StoreOpener,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let assessment = execute_assess(&config, opener)?;
    write_assessment(writer, &assessment)
}

pub(crate) fn execute_assess(
    config: &AssessConfig,
    opener: &dyn StoreOpener,
) -> Result<SafetyAssessment, CliError> {
    debug!(
        "Assessing ({}, {}) within {} km using {}",
        config.area.lat(),
        config.area.lng(),
        config.area.radius_km(),
        config.store.connection_string
    );
    let store = opener.open(&config.store)?;
    let scorer = SafetyScorer::new(PenaltyWeights::default(), config.zero_baselines);
    let assessor = SafetyAssessor::new(&*store)
        .with_grid(config.grid)
        .with_scorer(scorer);
    assessor.assess(&config.area).map_err(CliError::from)
}

pub(crate) fn write_assessment(
    writer: &mut dyn Write,
    assessment: &SafetyAssessment,
) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(assessment).map_err(CliError::SerialiseAssessment)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AssessConfig, CliError> {
    let merged = AssessArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AssessConfig::try_from(merged)
}
