//! Core domain types for the Helgo recommendation engine.
//!
//! These models validate their input at construction or decode time so the
//! ranker never has to second-guess a catalog entry or a parsed request.
//! Constructors return `Result` to surface invalid input early.
//!
//! The crate also defines the collaborator seams the ranker consumes:
//! [`CatalogSource`] for catalog snapshots, [`QueryEmbedder`] for query
//! vectors and [`ExperienceMetrics`] for itinerary metrics.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod catalog;
pub mod context;
pub mod distance;
pub mod embedding;
pub mod intent;
pub mod metrics;
pub mod place;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{CatalogError, CatalogSnapshot, CatalogSource, SourceTier, StaticCatalog, TieredCatalog};
pub use context::{Daylight, RAIN_THRESHOLD_MM, RecommendationContext, Weather};
pub use distance::{EARTH_RADIUS_KM, haversine_km, valid_coordinate};
pub use embedding::{
    DEFAULT_EMBEDDING_TIMEOUT, EmbeddingClient, EmbeddingError, QueryEmbedder,
    fetch_query_embedding,
};
pub use intent::{
    AreaFilter, Constraint, Cuisine, GroupContext, IndoorPreference, Intent, IntentError,
    PhotoMode, Vibe, WalkingPreference, parse_terms,
};
pub use metrics::{ExperienceMetrics, HeuristicMetrics, ItineraryMetrics};
pub use place::{
    Category, Place, PlaceError, PlaceId, PriceTier, SeasonalWindow, Setting, Tag, TimeOfDay,
    UnknownVariant,
};
