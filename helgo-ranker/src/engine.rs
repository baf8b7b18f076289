//! The recommendation engine: owns indices, sessions and randomness.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use helgo_core::{
    CatalogSource, EmbeddingClient, ExperienceMetrics, Intent, Place, RecommendationContext,
    SourceTier,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use time::OffsetDateTime;

use crate::config::EngineConfig;
use crate::error::{ConfigError, RecommendationError};
use crate::indices::IndexSet;
use crate::response::ItineraryResponse;
use crate::scoring::{ScoringPipeline, is_natural_language};
use crate::selection::{Itinerary, SelectionRequest, recommend};
use crate::session::{SessionId, SessionState};

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendOptions {
    /// Maximum number of itineraries; the engine default when `None`.
    pub limit: Option<usize>,
    /// Precomputed query embedding. Replaces lexical matching when its
    /// dimension matches the catalog. When absent, an engine with an
    /// embedding client fetches one for the request text.
    pub query_embedding: Option<Vec<f32>>,
    /// Conversation the request belongs to.
    pub session: SessionId,
}

impl RecommendOptions {
    /// Options for `session` with defaults elsewhere.
    #[must_use]
    pub fn for_session(session: impl Into<SessionId>) -> Self {
        Self {
            session: session.into(),
            ..Self::default()
        }
    }

    /// Set the itinerary limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Attach a query embedding.
    #[must_use]
    pub fn with_query_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.query_embedding = Some(embedding);
        self
    }
}

/// Recommends anchor and satellite itineraries from an indexed catalog.
///
/// The engine is `Send + Sync`. Index rebuilds swap an [`Arc`] so readers
/// always see a complete index set. Sessions share one lock, as does the
/// random source.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use helgo_core::{Category, Intent, Place, RecommendationContext};
/// use helgo_ranker::{Engine, EngineConfig, RecommendOptions};
/// use rand_chacha::ChaCha8Rng;
/// use rand::SeedableRng;
/// use time::macros::datetime;
///
/// let engine = Engine::with_rng(EngineConfig::default(), ChaCha8Rng::seed_from_u64(1))?;
/// let places = vec![
///     Place::new("a", "Lindenhof", Category::Viewpoint, Coord { x: 8.541, y: 47.373 })?,
///     Place::new("b", "Limmatquai", Category::Walk, Coord { x: 8.543, y: 47.372 })?,
/// ];
/// assert!(engine.build_indices(places, datetime!(2025-01-01 0:00 UTC)));
///
/// let context = RecommendationContext::at(datetime!(2025-06-01 18:30 UTC));
/// let itineraries = engine.generate_itineraries(&Intent::default(), &context, &RecommendOptions::default())?;
/// assert!(!itineraries.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Engine {
    config: EngineConfig,
    indices: RwLock<Arc<IndexSet>>,
    sessions: Mutex<HashMap<SessionId, SessionState>>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    metrics: Option<Arc<dyn ExperienceMetrics>>,
    embedder: Option<EmbeddingClient>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("places", &self.indices().len())
            .field("metrics", &self.metrics.is_some())
            .field("embedder", &self.embedder)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine seeded from system entropy.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Create an engine drawing from `rng`, for reproducible output.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn with_rng(
        config: EngineConfig,
        rng: impl RngCore + Send + 'static,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validate()?,
            indices: RwLock::new(Arc::new(IndexSet::default())),
            sessions: Mutex::new(HashMap::new()),
            rng: Mutex::new(Box::new(rng)),
            metrics: None,
            embedder: None,
        })
    }

    /// Attach itinerary metrics to every generated itinerary.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn ExperienceMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Embed request text through `client` when the caller supplies no
    /// query embedding. A failed or timed-out fetch falls back to lexical
    /// matching.
    #[must_use]
    pub fn with_embedder(mut self, client: EmbeddingClient) -> Self {
        self.embedder = Some(client);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current index set.
    #[must_use]
    pub fn indices(&self) -> Arc<IndexSet> {
        Arc::clone(&self.indices.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Rebuild every index from `places` when `freshness` is newer than the
    /// current build. Returns whether a rebuild happened.
    pub fn build_indices(&self, places: Vec<Place>, freshness: OffsetDateTime) -> bool {
        if !self.indices().is_stale(freshness) {
            log::debug!("catalog at {freshness} is already indexed");
            return false;
        }
        let rebuilt = Arc::new(IndexSet::build(places, freshness));
        let mut current = self
            .indices
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // A concurrent rebuild may have installed a newer snapshot meanwhile.
        if !current.is_stale(freshness) {
            return false;
        }
        *current = rebuilt;
        true
    }

    /// Load a snapshot from `source` and index it.
    ///
    /// # Errors
    /// Returns [`RecommendationError::CatalogUnavailable`] when the source
    /// fails.
    pub fn refresh_catalog(
        &self,
        source: &dyn CatalogSource,
    ) -> Result<SourceTier, RecommendationError> {
        let snapshot = source
            .load()
            .map_err(RecommendationError::CatalogUnavailable)?;
        let tier = snapshot.tier;
        self.build_indices(snapshot.places, snapshot.freshness);
        Ok(tier)
    }

    /// Score one place against a request using the default session and the
    /// lexical index.
    #[must_use]
    pub fn score_place(
        &self,
        place: &Place,
        intent: &Intent,
        context: &RecommendationContext,
    ) -> f64 {
        let indices = self.indices();
        let session = self.session_snapshot(&SessionId::default());
        let scoring = self.config.scoring_for(is_natural_language(intent));
        let pipeline = ScoringPipeline::new(&indices, intent, context, &session, scoring, None);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        pipeline.score(place, rng.as_mut()).score
    }

    /// Recommend itineraries for `intent`.
    ///
    /// Anchors and satellites of a successful result are recorded as shown in
    /// the options' session.
    ///
    /// # Errors
    /// Returns [`RecommendationError::IndexNotBuilt`] before any catalog is
    /// indexed, [`RecommendationError::InvalidIntent`] for an invalid intent,
    /// and the filtering errors described on
    /// [`filter_candidates`](crate::filter_candidates).
    pub fn generate_itineraries(
        &self,
        intent: &Intent,
        context: &RecommendationContext,
        options: &RecommendOptions,
    ) -> Result<Vec<Itinerary>, RecommendationError> {
        let checked = intent.clone().validate()?;
        let indices = self.indices();
        if indices.is_empty() {
            return Err(RecommendationError::IndexNotBuilt);
        }
        let session = self.session_snapshot(&options.session);
        let fetched = if options.query_embedding.is_none() {
            self.fetch_embedding(&checked, &indices)
        } else {
            None
        };
        let request = SelectionRequest {
            indices: &indices,
            intent: &checked,
            context,
            session: &session,
            config: &self.config,
            limit: options.limit.unwrap_or(self.config.default_limit),
            query_embedding: options.query_embedding.as_deref().or(fetched.as_deref()),
        };
        let mut itineraries = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            recommend(&request, rng.as_mut())?
        };

        if let Some(metrics) = &self.metrics {
            for itinerary in &mut itineraries {
                let anchor = &itinerary.anchor.place;
                itinerary.metrics = Some(metrics.evaluate(
                    anchor,
                    &context.weather,
                    &context.daylight,
                    anchor.elevation_m,
                ));
            }
        }
        self.record_shown_places(
            &options.session,
            itineraries
                .iter()
                .flat_map(|itinerary| [&itinerary.anchor.place, &itinerary.satellite.place]),
        );
        Ok(itineraries)
    }

    /// Recommend itineraries with no request at all, driven by context,
    /// exploration and the session alone.
    ///
    /// # Errors
    /// See [`Engine::generate_itineraries`].
    pub fn generate_greeting_itineraries(
        &self,
        context: &RecommendationContext,
        options: &RecommendOptions,
    ) -> Result<Vec<Itinerary>, RecommendationError> {
        self.generate_itineraries(&Intent::default(), context, options)
    }

    /// [`Engine::generate_itineraries`] folded into a tagged response.
    #[must_use]
    pub fn respond(
        &self,
        intent: &Intent,
        context: &RecommendationContext,
        options: &RecommendOptions,
    ) -> ItineraryResponse {
        self.generate_itineraries(intent, context, options).into()
    }

    /// The user liked or picked `place`.
    pub fn record_positive_interaction(&self, session: &SessionId, place: &Place) {
        self.with_session(session, |state| state.record_positive_interaction(place));
    }

    /// The user dismissed `place`.
    pub fn record_negative_interaction(&self, session: &SessionId, place: &Place) {
        self.with_session(session, |state| state.record_negative_interaction(place));
    }

    /// Mark `places` as shown in `session`.
    pub fn record_shown_places<'a, I>(&self, session: &SessionId, places: I)
    where
        I: IntoIterator<Item = &'a Place>,
    {
        self.with_session(session, |state| state.record_shown_places(places));
    }

    /// Copy of the session state; a fresh state for unknown sessions.
    #[must_use]
    pub fn session_snapshot(&self, session: &SessionId) -> SessionState {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// Forget every session.
    pub fn reset_sessions(&self) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drop the indices; the next build always rebuilds.
    pub fn clear_indices(&self) {
        *self
            .indices
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(IndexSet::default());
    }

    fn fetch_embedding(&self, intent: &Intent, indices: &IndexSet) -> Option<Vec<f32>> {
        let client = self.embedder.as_ref()?;
        let text = intent.raw_text.trim();
        if text.is_empty() || indices.embeddings().is_empty() {
            return None;
        }
        client.embed_blocking(text)
    }

    fn with_session(&self, session: &SessionId, update: impl FnOnce(&mut SessionState)) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        update(sessions.entry(session.clone()).or_default());
    }
}
