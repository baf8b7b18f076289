//! Recommend command implementation for the Helgo CLI.

use std::io::{BufReader, Write};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geo::Coord;
use helgo_core::{
    CatalogSource, HeuristicMetrics, Intent, RecommendationContext, SourceTier, TieredCatalog,
    Weather, valid_coordinate,
};
use helgo_ranker::{Engine, EngineConfig, ItineraryResponse, RecommendOptions};
use log::{debug, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::catalog::{BundledCatalog, JsonCatalog};
use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_RECOMMEND_CATALOG, ARG_RECOMMEND_INTENT, ARG_RECOMMEND_LATITUDE, ARG_RECOMMEND_LONGITUDE,
    CliError,
};

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Recommend anchor and satellite itineraries from a JSON \
                 place catalog. The catalog file is tried first and the \
                 dataset bundled with the binary is used when it cannot be \
                 loaded. The request is given as free text, a JSON-encoded \
                 Intent, or both; with neither, a greeting is produced from \
                 the context alone.",
    about = "Recommend itineraries for a request"
)]
#[ortho_config(prefix = "HELGO")]
pub(crate) struct RecommendArgs {
    /// Free-text request, e.g. "cozy italian dinner".
    #[arg(value_name = "text")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Path to a JSON catalog of places.
    #[arg(long = ARG_RECOMMEND_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Path to a JSON file containing an Intent.
    #[arg(long = ARG_RECOMMEND_INTENT, value_name = "path")]
    #[serde(default)]
    pub(crate) intent: Option<Utf8PathBuf>,
    /// Local time of the request (RFC 3339). Defaults to now.
    #[arg(long, value_name = "timestamp")]
    #[serde(default)]
    pub(crate) at: Option<String>,
    /// The user's latitude.
    #[arg(long = ARG_RECOMMEND_LATITUDE, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// The user's longitude.
    #[arg(long = ARG_RECOMMEND_LONGITUDE, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Air temperature in degrees Celsius.
    #[arg(long, value_name = "celsius", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) temperature_c: Option<f64>,
    /// Precipitation over the last hour in millimetres.
    #[arg(long, value_name = "mm")]
    #[serde(default)]
    pub(crate) precipitation_mm: Option<f64>,
    /// Maximum number of itineraries.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Seed for reproducible sampling.
    #[arg(long, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Session whose learned preferences apply.
    #[arg(long, value_name = "id")]
    #[serde(default)]
    pub(crate) session: Option<String>,
    /// Attach experience metrics to each itinerary.
    #[arg(long)]
    #[serde(default)]
    pub(crate) metrics: bool,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    /// Free-text request.
    pub(crate) query: Option<String>,
    /// Catalog file tried before the bundled dataset.
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// JSON intent file.
    pub(crate) intent: Option<Utf8PathBuf>,
    /// Local time of the request.
    pub(crate) now: OffsetDateTime,
    /// The user's position.
    pub(crate) user_location: Option<Coord<f64>>,
    /// Weather at request time.
    pub(crate) weather: Weather,
    /// Maximum number of itineraries.
    pub(crate) limit: Option<usize>,
    /// Sampling seed.
    pub(crate) seed: Option<u64>,
    /// Session identifier.
    pub(crate) session: String,
    /// Whether to attach metrics.
    pub(crate) metrics: bool,
}

impl RecommendConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        if let Some(path) = &self.catalog {
            require_existing(path, ARG_RECOMMEND_CATALOG)?;
        }
        if let Some(path) = &self.intent {
            require_existing(path, ARG_RECOMMEND_INTENT)?;
        }
        Ok(())
    }

    fn context(&self) -> RecommendationContext {
        let context = RecommendationContext::at(self.now).with_weather(self.weather);
        match self.user_location {
            Some(location) => context.with_user_location(location),
            None => context,
        }
    }

    fn options(&self) -> RecommendOptions {
        let options = RecommendOptions::for_session(self.session.as_str());
        match self.limit {
            Some(limit) => options.with_limit(limit),
            None => options,
        }
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn resolve_now(at: Option<String>) -> Result<OffsetDateTime, CliError> {
    match at {
        Some(value) => OffsetDateTime::parse(&value, &Rfc3339)
            .map_err(|source| CliError::InvalidTimestamp { value, source }),
        None => Ok(OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())),
    }
}

fn resolve_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coord<f64>>, CliError> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(CliError::IncompleteLocation {
            present: ARG_RECOMMEND_LATITUDE,
            missing: ARG_RECOMMEND_LONGITUDE,
        }),
        (None, Some(_)) => Err(CliError::IncompleteLocation {
            present: ARG_RECOMMEND_LONGITUDE,
            missing: ARG_RECOMMEND_LATITUDE,
        }),
        (Some(lat), Some(lon)) => {
            let location = Coord { x: lon, y: lat };
            if valid_coordinate(location) {
                Ok(Some(location))
            } else {
                Err(CliError::InvalidLocation {
                    latitude: lat,
                    longitude: lon,
                })
            }
        }
    }
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let now = resolve_now(args.at)?;
        let user_location = resolve_location(args.latitude, args.longitude)?;
        let defaults = Weather::default();
        let weather = Weather {
            temperature_c: args.temperature_c.unwrap_or(defaults.temperature_c),
            precipitation_mm: args.precipitation_mm.unwrap_or(defaults.precipitation_mm),
            ..defaults
        };
        Ok(Self {
            query: args.query.filter(|text| !text.trim().is_empty()),
            catalog: args.catalog,
            intent: args.intent,
            now,
            user_location,
            weather,
            limit: args.limit,
            seed: args.seed,
            session: args.session.unwrap_or_else(|| "cli".to_owned()),
            metrics: args.metrics,
        })
    }
}

pub(super) fn run_recommend(args: RecommendArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_recommend_with(args, &mut stdout)
}

pub(super) fn run_recommend_with(
    args: RecommendArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_recommend_config(args)?;
    let response = execute_recommend(&config)?;
    write_response(writer, &response)
}

fn resolve_recommend_config(args: RecommendArgs) -> Result<RecommendConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Index the catalog and answer the configured request.
pub(crate) fn execute_recommend(config: &RecommendConfig) -> Result<ItineraryResponse, CliError> {
    let intent = load_request_intent(config)?;
    let engine = build_engine(config)?;
    let tier = engine
        .refresh_catalog(&catalog_for(config))
        .map_err(CliError::Catalog)?;
    info!("indexed {} places from the {tier} catalog", engine.indices().len());

    let context = config.context();
    let options = config.options();
    debug!(
        "recommending for session {} at {} (raining: {})",
        options.session,
        context.now,
        context.weather.is_raining()
    );
    Ok(engine.respond(&intent, &context, &options))
}

fn build_engine(config: &RecommendConfig) -> Result<Engine, CliError> {
    let engine_config = EngineConfig::default();
    let engine = match config.seed {
        Some(seed) => Engine::with_rng(engine_config, ChaCha8Rng::seed_from_u64(seed))?,
        None => Engine::new(engine_config)?,
    };
    if config.metrics {
        Ok(engine.with_metrics(Arc::new(HeuristicMetrics)))
    } else {
        Ok(engine)
    }
}

fn catalog_for(config: &RecommendConfig) -> TieredCatalog {
    let mut sources: Vec<Box<dyn CatalogSource>> = Vec::with_capacity(2);
    if let Some(path) = &config.catalog {
        sources.push(Box::new(JsonCatalog::new(path.clone(), SourceTier::Cache)));
    }
    sources.push(Box::new(BundledCatalog));
    TieredCatalog::new(sources)
}

fn load_request_intent(config: &RecommendConfig) -> Result<Intent, CliError> {
    let mut intent = match &config.intent {
        Some(path) => load_intent(path)?,
        None => Intent::default(),
    };
    if let Some(query) = &config.query {
        intent.raw_text.clone_from(query);
    }
    Ok(intent)
}

/// Loads a JSON-encoded [`Intent`] from disk.
pub(super) fn load_intent(path: &Utf8Path) -> Result<Intent, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenIntent {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseIntent {
        path: path.to_path_buf(),
        source,
    })
}

fn write_response(writer: &mut dyn Write, response: &ItineraryResponse) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(response).map_err(CliError::SerialiseResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RecommendConfig, CliError> {
    let merged = RecommendArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RecommendConfig::try_from(merged)
}
