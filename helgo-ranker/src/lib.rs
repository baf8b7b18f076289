//! Ranking and recommendation for the Helgo place engine.
//!
//! The crate turns a catalog of [`Place`](helgo_core::Place)s into anchor and
//! satellite itineraries:
//! - **Indices** are built once per catalog snapshot: a TF-IDF index with
//!   query expansion, an embedding index and an R*-tree for radius queries.
//! - **Scoring** blends intent match, text similarity, situational context,
//!   Thompson-sampled exploration and learned session preference.
//! - **Selection** filters candidates, softmax-samples and MMR-diversifies
//!   anchors, then pairs each anchor with a nearby satellite.
//!
//! [`Engine`] ties these together behind thread-safe operations and keeps
//! per-session Beta beliefs that interactions update.
//!
//! # Examples
//!
//! ```
//! use helgo_core::{Cuisine, Intent, RecommendationContext, StaticCatalog, SourceTier};
//! use helgo_core::test_support::{fixed_freshness, zurich_catalog};
//! use helgo_ranker::{Engine, EngineConfig, RecommendOptions, RecommendationError};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use time::macros::datetime;
//!
//! let engine = Engine::with_rng(EngineConfig::default(), ChaCha8Rng::seed_from_u64(7))?;
//! engine.refresh_catalog(&StaticCatalog::new(zurich_catalog(), fixed_freshness(), SourceTier::Cache))?;
//!
//! let context = RecommendationContext::at(datetime!(2025-07-15 19:00 +02:00));
//! let intent = Intent { cuisines: vec![Cuisine::Turkish], ..Intent::default() };
//! let err = engine
//!     .generate_itineraries(&intent, &context, &RecommendOptions::default())
//!     .unwrap_err();
//! assert!(matches!(err, RecommendationError::NoCuisineMatch { .. }));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod decay;
mod diversity;
mod embedding_index;
mod engine;
mod error;
mod exploration;
mod indices;
mod reasons;
mod response;
mod scoring;
mod selection;
mod session;
mod spatial;
mod text;
mod tfidf;

pub use config::{BlendWeights, EngineConfig, ScoringConfig};
pub use decay::{
    DecayParameters, exponential_decay, gaussian_decay, logarithmic_decay, sigmoid_decay,
};
pub use diversity::{experiential_distance, is_too_similar, jaccard_similarity, mmr_select};
pub use embedding_index::{EmbeddingIndex, normalize};
pub use engine::{Engine, RecommendOptions};
pub use error::{ConfigError, RecommendationError};
pub use exploration::{
    MIN_TEMPERATURE, exploration_score, sample_beta, sample_gamma, softmax_select,
};
pub use indices::IndexSet;
pub use reasons::{anchor_reason, distance_reason, satellite_reason};
pub use response::ItineraryResponse;
pub use scoring::{
    QuerySignal, ScoreBreakdown, ScoredPlace, ScoringPipeline, base_score, context_score,
    is_natural_language,
};
pub use selection::{
    Itinerary, SelectionRequest, distance_score, filter_candidates, recommend, select_anchors,
    select_satellite,
};
pub use session::{BetaPrior, SessionId, SessionState};
pub use spatial::SpatialIndex;
pub use text::{expand_query, keyword_overlap, place_document, tokenize};
pub use tfidf::{LexicalQuery, SparseVector, TfIdfIndex, cosine_similarity};
