//! Tagged response shape for UI and CLI output.

use serde::Serialize;

use crate::error::RecommendationError;
use crate::selection::Itinerary;

/// Outcome of a recommendation request, tagged by `status`.
///
/// # Examples
/// ```
/// use helgo_ranker::{ItineraryResponse, RecommendationError};
///
/// let response = ItineraryResponse::from(Err(RecommendationError::NoCuisineMatch {
///     cuisine: "turkish".to_owned(),
/// }));
/// let json = serde_json::to_value(&response)?;
/// assert_eq!(json["status"], "error");
/// assert_eq!(json["error"], "no_cuisine_match");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItineraryResponse {
    /// Itineraries were produced.
    Ready {
        /// The itineraries, best first.
        itineraries: Vec<Itinerary>,
    },
    /// The request failed.
    Error {
        /// Machine-readable error code.
        error: String,
        /// Human-readable explanation naming the cuisine or area at fault.
        reason: String,
    },
}

impl ItineraryResponse {
    /// Report whether itineraries were produced.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

impl From<Result<Vec<Itinerary>, RecommendationError>> for ItineraryResponse {
    fn from(result: Result<Vec<Itinerary>, RecommendationError>) -> Self {
        match result {
            Ok(itineraries) => Self::Ready { itineraries },
            Err(err) => Self::Error {
                error: err.code().to_owned(),
                reason: err.to_string(),
            },
        }
    }
}
