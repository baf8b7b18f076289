//! Error types emitted by the Helgo CLI.
//!
//! Keep this error type reasonably small, as CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use helgo_ranker::{ConfigError, RecommendationError};
use thiserror::Error;

/// Errors emitted by the Helgo CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The `--at` timestamp is not RFC 3339.
    #[error("invalid timestamp {value:?} (expected RFC 3339): {source}")]
    InvalidTimestamp {
        /// Raw flag value.
        value: String,
        /// Parser error.
        #[source]
        source: time::error::Parse,
    },
    /// Only one half of the user location was supplied.
    #[error("--{present} requires --{missing}")]
    IncompleteLocation {
        /// Flag that was given.
        present: &'static str,
        /// Flag that was not.
        missing: &'static str,
    },
    /// The user location lies outside valid latitude/longitude ranges.
    #[error("location ({latitude}, {longitude}) is not a valid coordinate")]
    InvalidLocation {
        /// Supplied latitude.
        latitude: f64,
        /// Supplied longitude.
        longitude: f64,
    },
    /// Opening the intent file failed.
    #[error("failed to open intent at {path:?}: {source}")]
    OpenIntent {
        /// Intent path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Intent JSON could not be decoded.
    #[error("failed to parse intent JSON at {path:?}: {source}")]
    ParseIntent {
        /// Intent path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The engine configuration was rejected.
    #[error("invalid engine configuration: {0}")]
    EngineConfig(#[from] ConfigError),
    /// No catalog tier could be loaded.
    #[error("failed to load a catalog: {0}")]
    Catalog(#[source] RecommendationError),
    /// Serialising the response failed.
    #[error("failed to serialise recommendation response: {0}")]
    SerialiseResponse(#[source] serde_json::Error),
    /// Writing the response failed.
    #[error("failed to write recommendation output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
