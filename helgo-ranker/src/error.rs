//! Error types raised by the ranker.

use helgo_core::{CatalogError, IntentError};
use thiserror::Error;

/// Errors raised when validating scoring or engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A blend weight was negative or not finite, or all weights were zero.
    #[error("blend weights must be finite, non-negative and sum to more than zero")]
    InvalidWeights,
    /// The softmax temperature was not a positive finite number.
    #[error("softmax temperature must be positive and finite, got {value}")]
    InvalidTemperature {
        /// Rejected temperature.
        value: f64,
    },
    /// A unit-interval parameter was out of range.
    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange {
        /// Name of the parameter.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A pool or result size was zero.
    #[error("{field} must be at least one")]
    ZeroSize {
        /// Name of the parameter.
        field: &'static str,
    },
    /// The satellite radius was not a positive finite number.
    #[error("satellite radius must be positive and finite, got {value}")]
    InvalidRadius {
        /// Rejected radius in kilometres.
        value: f64,
    },
}

/// Errors returned by the recommendation operations.
#[derive(Debug, Error)]
pub enum RecommendationError {
    /// The cuisine filter left nothing to recommend.
    #[error("no restaurants match the requested cuisine: {cuisine}")]
    NoCuisineMatch {
        /// Requested cuisines, comma-separated.
        cuisine: String,
    },
    /// The area filter left nothing to recommend, even after widening.
    #[error("no places found in {area}")]
    NoAreaMatch {
        /// Display name of the area.
        area: String,
    },
    /// Every catalog tier failed.
    #[error("catalog unavailable")]
    CatalogUnavailable(#[source] CatalogError),
    /// Recommendations were requested before any catalog was indexed.
    #[error("no catalog has been indexed yet")]
    IndexNotBuilt,
    /// Filtering and selection produced no itinerary.
    #[error("no candidate places are available")]
    NoCandidates,
    /// The intent failed validation.
    #[error("invalid intent")]
    InvalidIntent(#[from] IntentError),
}

impl RecommendationError {
    /// Stable machine-readable code for responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoCuisineMatch { .. } => "no_cuisine_match",
            Self::NoAreaMatch { .. } => "no_area_match",
            Self::CatalogUnavailable(_) => "catalog_unavailable",
            Self::IndexNotBuilt => "index_not_built",
            Self::NoCandidates => "no_candidates",
            Self::InvalidIntent(_) => "invalid_intent",
        }
    }
}
