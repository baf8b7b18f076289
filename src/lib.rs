//! Facade crate for the Helgo recommendation engine.
//!
//! This crate re-exports the core domain types and the ranking engine so
//! applications can depend on a single crate.
//!
//! # Examples
//!
//! ```
//! use helgo_engine::{Engine, EngineConfig, RecommendationContext, RecommendOptions};
//! use time::macros::datetime;
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let context = RecommendationContext::at(datetime!(2025-07-15 19:00 +02:00));
//! let outcome = engine.generate_greeting_itineraries(&context, &RecommendOptions::default());
//! assert!(outcome.is_err(), "nothing is indexed yet");
//! # Ok::<(), helgo_engine::ConfigError>(())
//! ```

#![forbid(unsafe_code)]

pub use helgo_core::{
    AreaFilter, CatalogError, CatalogSnapshot, CatalogSource, Category, Constraint, Cuisine,
    Daylight, EmbeddingClient, EmbeddingError, ExperienceMetrics, GroupContext, HeuristicMetrics,
    IndoorPreference, Intent, IntentError, ItineraryMetrics, PhotoMode, Place, PlaceError,
    PlaceId, PriceTier, QueryEmbedder, RecommendationContext, SeasonalWindow, Setting,
    SourceTier, StaticCatalog, Tag, TieredCatalog, TimeOfDay, Vibe, WalkingPreference, Weather,
    fetch_query_embedding,
};
pub use helgo_ranker::{
    ConfigError, Engine, EngineConfig, Itinerary, ItineraryResponse, RecommendOptions,
    RecommendationError, ScoredPlace, ScoringConfig, SessionId, SessionState,
};
