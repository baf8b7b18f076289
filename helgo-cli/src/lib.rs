//! Command-line interface for the Helgo recommendation engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod catalog;
mod error;
mod fs;
mod recommend;

pub use catalog::{BundledCatalog, JsonCatalog};
pub use error::CliError;

use recommend::RecommendArgs;

pub(crate) const ARG_RECOMMEND_CATALOG: &str = "catalog";
pub(crate) const ARG_RECOMMEND_INTENT: &str = "intent";
pub(crate) const ARG_RECOMMEND_LATITUDE: &str = "latitude";
pub(crate) const ARG_RECOMMEND_LONGITUDE: &str = "longitude";

/// Run the Helgo CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, inputs or output
/// handling fail. Requests that merely find nothing are reported in the
/// printed response instead.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Recommend(args) => recommend::run_recommend(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "helgo",
    about = "Place recommendations as anchor and satellite itineraries",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend itineraries from a place catalog.
    Recommend(RecommendArgs),
}

#[cfg(test)]
mod tests;
