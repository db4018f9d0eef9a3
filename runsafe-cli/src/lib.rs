//! Command-line interface for RunSafe crash-safety assessments.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod assess;
mod error;

pub use error::CliError;

use assess::{AssessArgs, SqliteStoreOpener, run_assess};

pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LNG: &str = "lng";
pub(crate) const ARG_RADIUS_KM: &str = "radius-km";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_QUERY_TIMEOUT_MS: &str = "query-timeout-ms";
pub(crate) const ENV_LAT: &str = "RUNSAFE_CMDS_ASSESS_LAT";
pub(crate) const ENV_LNG: &str = "RUNSAFE_CMDS_ASSESS_LNG";
pub(crate) const ENV_DATABASE: &str = "RUNSAFE_CMDS_ASSESS_DATABASE";

/// Radius used when none is configured.
pub(crate) const DEFAULT_RADIUS_KM: f64 = 0.5;

/// Run the RunSafe CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, or when
/// the assessment cannot be produced and written to stdout.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Assess(args) => {
            let mut stdout = std::io::stdout().lock();
            run_assess(args, &SqliteStoreOpener, &mut stdout)?;
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "runsafe",
    about = "Crash-safety scores for running locations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score how safe an area is from historical traffic crashes.
    Assess(AssessArgs),
}

#[cfg(test)]
mod tests;
