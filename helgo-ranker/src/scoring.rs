//! Multi-signal scoring of a single place.
//!
//! Five signals feed the final score:
//! - **base** rewards matches against the parsed intent;
//! - **semantic** compares the request text with the place, lexically or by
//!   embedding;
//! - **context** reacts to weather, daylight, distance, popularity and
//!   season;
//! - **exploration** is a Thompson sample from the session's beliefs;
//! - **session** is the posterior mean of those beliefs.
//!
//! Each signal is multiplied by its [`BlendWeights`](crate::BlendWeights)
//! entry and the products are summed.

#![expect(
    clippy::float_arithmetic,
    reason = "scores are weighted sums of floating-point signals"
)]

use helgo_core::{
    Category, Constraint, IndoorPreference, Intent, PhotoMode, Place, PriceTier,
    RecommendationContext, Setting, TimeOfDay, haversine_km,
};
use rand::Rng;
use serde::Serialize;

use crate::config::ScoringConfig;
use crate::decay::DecayParameters;
use crate::exploration::exploration_score;
use crate::indices::IndexSet;
use crate::reasons::anchor_reason;
use crate::session::SessionState;
use crate::tfidf::LexicalQuery;

/// Phrases that mark a request as conversational rather than a keyword list.
const FILLER_PHRASES: &[&str] = &[
    "something",
    "looking for",
    "place",
    "somewhere",
    "anything",
    "i want",
    "i'd like",
    "recommend",
    "suggest",
    "where can",
];

/// Requests longer than this many characters count as natural language.
const NATURAL_LANGUAGE_MIN_CHARS: usize = 25;

const PHOTO_TAGS: &[&str] = &["photo", "view", "scenic", "panorama", "sunset"];
const EVENING_TAGS: &[&str] = &["cocktails", "wine", "romantic", "nightlife"];
const GOLDEN_HOUR_TAGS: &[&str] = &["view", "photo", "sunset"];

/// Report whether `intent` reads as a conversational request.
///
/// Requests naming cuisines or categories never qualify. Otherwise the
/// trimmed text must be longer than 25 characters or contain a filler phrase
/// such as "looking for".
///
/// # Examples
/// ```
/// use helgo_core::Intent;
/// use helgo_ranker::is_natural_language;
///
/// let chatty = Intent { raw_text: "somewhere calm".to_owned(), ..Intent::default() };
/// let terse = Intent { raw_text: "calm".to_owned(), ..Intent::default() };
/// assert!(is_natural_language(&chatty));
/// assert!(!is_natural_language(&terse));
/// ```
#[must_use]
pub fn is_natural_language(intent: &Intent) -> bool {
    if !intent.cuisines.is_empty() || !intent.categories.is_empty() {
        return false;
    }
    let text = intent.raw_text.trim();
    if text.chars().count() > NATURAL_LANGUAGE_MIN_CHARS {
        return true;
    }
    let lowered = text.to_lowercase();
    FILLER_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

fn is_photogenic(place: &Place) -> bool {
    place.has_any_tag(PHOTO_TAGS)
        || !place.photo_spots.is_empty()
        || place.category == Category::Viewpoint
}

/// Intent-match score.
///
/// Rewards requested categories, cuisines and vibes, honours constraints,
/// indoor preference, time budget and photo mode, and adds a small variety
/// bonus for richly tagged places.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "tag counts are small")]
pub fn base_score(place: &Place, intent: &Intent) -> f64 {
    let mut score = 0.0;

    if !intent.categories.is_empty() {
        score += if intent.wants_category(place.category) {
            40.0
        } else {
            -10.0
        };
    }
    for cuisine in &intent.cuisines {
        if place.has_tag(cuisine.as_str()) {
            score += 35.0;
        }
    }
    for vibe in &intent.vibes {
        if place.has_tag(vibe.as_str()) {
            score += 20.0;
        }
    }
    for constraint in &intent.constraints {
        score += constraint_score(place, *constraint);
    }
    score += indoor_preference_score(place.setting, intent.indoor_preference);
    if let Some(budget) = intent.time_budget_mins {
        score += match place.duration_mins.abs_diff(budget) {
            0..=30 => 15.0,
            31..=60 => 5.0,
            _ => -5.0,
        };
    }
    score += match (intent.photo_mode, is_photogenic(place)) {
        (PhotoMode::Casual, true) => 10.0,
        (PhotoMode::Focused, true) => 25.0,
        (PhotoMode::Focused, false) => -10.0,
        (PhotoMode::None | PhotoMode::Casual, _) => 0.0,
    };

    score + (2.0 * place.tags.len() as f64).min(12.0)
}

fn constraint_score(place: &Place, constraint: Constraint) -> f64 {
    match constraint {
        Constraint::Budget => {
            if place.has_tag("cheap") || place.price_tier == Some(PriceTier::Budget) {
                15.0
            } else if place.price_tier == Some(PriceTier::Upscale) {
                -10.0
            } else {
                0.0
            }
        }
        Constraint::Quiet => {
            if place.has_tag("quiet") {
                15.0
            } else if place.has_any_tag(&["lively", "touristy"]) || place.category == Category::Bar
            {
                -10.0
            } else {
                0.0
            }
        }
        Constraint::Rain => match place.setting {
            Setting::Indoor => 20.0,
            Setting::Mixed => 5.0,
            Setting::Outdoor => -20.0,
        },
        Constraint::FamilyFriendly => {
            if place.has_any_tag(&["family", "kids"])
                || matches!(place.category, Category::Park | Category::Museum)
            {
                15.0
            } else if place.category == Category::Bar {
                -15.0
            } else {
                0.0
            }
        }
        Constraint::Accessible => {
            if place.has_tag("accessible") {
                10.0
            } else {
                0.0
            }
        }
    }
}

const fn indoor_preference_score(setting: Setting, preference: IndoorPreference) -> f64 {
    match (preference, setting) {
        (IndoorPreference::NoPreference, _) => 0.0,
        (IndoorPreference::Mixed, Setting::Mixed)
        | (IndoorPreference::Indoor, Setting::Indoor)
        | (IndoorPreference::Outdoor, Setting::Outdoor) => 20.0,
        (IndoorPreference::Mixed, _)
        | (IndoorPreference::Indoor | IndoorPreference::Outdoor, Setting::Mixed) => 10.0,
        (IndoorPreference::Indoor, Setting::Outdoor)
        | (IndoorPreference::Outdoor, Setting::Indoor) => -10.0,
    }
}

/// Situational score: opening state, popularity, season, distance, weather
/// and time of day.
#[must_use]
pub fn context_score(place: &Place, intent: &Intent, context: &RecommendationContext) -> f64 {
    let mut score = 0.0;

    if place.closed {
        score -= 50.0;
    }
    if let Some(popularity) = place.popularity {
        score += (f64::from(popularity) - 50.0) / 5.0;
    }
    if !place.is_in_season(context.month()) {
        score -= 15.0;
    }
    if let Some(user) = context.user_location {
        let params = DecayParameters::adaptive(context, intent.walking);
        score += params.score(haversine_km(user, place.location));
    }

    let raining = context.is_raining();
    score += match place.setting {
        Setting::Indoor if raining => 15.0,
        Setting::Outdoor if !raining => 10.0,
        _ => 0.0,
    };

    let daylight = &context.daylight;
    if daylight.is_evening
        && (matches!(place.best_time, TimeOfDay::Evening | TimeOfDay::Night)
            || place.has_any_tag(EVENING_TAGS))
    {
        score += 10.0;
    }
    if daylight.is_golden_hour
        && (place.best_time == TimeOfDay::Sunset || place.has_any_tag(GOLDEN_HOUR_TAGS))
    {
        score += 15.0;
    }
    let hour = context.local_hour();
    let day_part = match place.best_time {
        TimeOfDay::Morning => (6..12).contains(&hour),
        TimeOfDay::Afternoon => (12..18).contains(&hour),
        TimeOfDay::Sunset | TimeOfDay::Evening | TimeOfDay::Night | TimeOfDay::Any => false,
    };
    if day_part {
        score += 5.0;
    }
    score
}

/// Weighted contribution of each signal to a final score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Weighted intent match.
    pub base: f64,
    /// Weighted text similarity.
    pub semantic: f64,
    /// Weighted situational score.
    pub context: f64,
    /// Weighted exploration draw.
    pub exploration: f64,
    /// Weighted session preference.
    pub session: f64,
}

impl ScoreBreakdown {
    /// Sum of the contributions.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.base + self.semantic + self.context + self.exploration + self.session
    }
}

/// A place with its score and the story behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlace {
    /// The recommended place.
    pub place: Place,
    /// Final score.
    pub score: f64,
    /// Per-signal contributions.
    pub breakdown: ScoreBreakdown,
    /// How sure the ranker is, on `[0, 1]`.
    pub confidence: f64,
    /// How new this kind of place is to the session, on `[0, 1]`.
    pub novelty: f64,
    /// Human-readable explanation.
    pub reason: String,
}

impl ScoredPlace {
    /// Build a scored place, deriving confidence and novelty.
    ///
    /// Novelty is `1 / (1 + n)` for `n` recorded interactions with the
    /// place's category, and zero for places already shown.
    #[must_use]
    pub fn new(
        place: Place,
        breakdown: ScoreBreakdown,
        score: f64,
        session: &SessionState,
        reason: String,
    ) -> Self {
        let novelty = if session.has_shown(&place.id) {
            0.0
        } else {
            1.0 / (1.0 + session.category_prior(place.category).observations())
        };
        Self {
            confidence: (score / 100.0).clamp(0.0, 1.0),
            place,
            score,
            breakdown,
            novelty,
            reason,
        }
    }
}

/// The request text prepared for one of the two similarity back ends.
#[derive(Debug, Clone)]
pub enum QuerySignal {
    /// TF-IDF cosine plus keyword overlap.
    Lexical(LexicalQuery),
    /// Cosine against place embeddings, with the query already normalised.
    Embedding(Vec<f32>),
}

/// Scores places for one request.
///
/// Built once per request so the query is vectorised once.
#[derive(Debug)]
pub struct ScoringPipeline<'a> {
    indices: &'a IndexSet,
    intent: &'a Intent,
    context: &'a RecommendationContext,
    session: &'a SessionState,
    config: &'a ScoringConfig,
    query: QuerySignal,
}

impl<'a> ScoringPipeline<'a> {
    /// Prepare a pipeline. A usable `query_embedding` selects the embedding
    /// back end; otherwise the request text is scored lexically.
    #[must_use]
    pub fn new(
        indices: &'a IndexSet,
        intent: &'a Intent,
        context: &'a RecommendationContext,
        session: &'a SessionState,
        config: &'a ScoringConfig,
        query_embedding: Option<&[f32]>,
    ) -> Self {
        let embedded = query_embedding
            .filter(|_| !indices.embeddings().is_empty())
            .and_then(|query| indices.embeddings().prepare_query(query));
        let query = embedded.map_or_else(
            || QuerySignal::Lexical(indices.tfidf().prepare_query(&intent.raw_text)),
            QuerySignal::Embedding,
        );
        Self {
            indices,
            intent,
            context,
            session,
            config,
            query,
        }
    }

    /// The similarity back end in use.
    #[must_use]
    pub const fn query(&self) -> &QuerySignal {
        &self.query
    }

    /// The situation the pipeline scores against.
    #[must_use]
    pub const fn context(&self) -> &RecommendationContext {
        self.context
    }

    /// The session the pipeline reads preferences from.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        self.session
    }

    /// Similarity of `place` to the request text on `0..=100`.
    #[must_use]
    pub fn semantic_score(&self, place: &Place) -> f64 {
        match &self.query {
            QuerySignal::Lexical(query) => self.indices.tfidf().semantic_score(place, query),
            QuerySignal::Embedding(query) => self.indices.embeddings().score(&place.id, query),
        }
    }

    /// Weighted contributions of every signal for `place`.
    pub fn breakdown<R: Rng + ?Sized>(&self, place: &Place, rng: &mut R) -> ScoreBreakdown {
        let weights = self.config.weights;
        ScoreBreakdown {
            base: weights.base * base_score(place, self.intent),
            semantic: weights.semantic * self.semantic_score(place),
            context: weights.context * context_score(place, self.intent, self.context),
            exploration: weights.exploration * exploration_score(place, self.session, rng),
            session: weights.session * self.session.session_boost(place),
        }
    }

    /// Score `place` and explain the result.
    pub fn score<R: Rng + ?Sized>(&self, place: &Place, rng: &mut R) -> ScoredPlace {
        let breakdown = self.breakdown(place, rng);
        let reason = anchor_reason(place, self.intent, self.context);
        ScoredPlace::new(
            place.clone(),
            breakdown,
            breakdown.total(),
            self.session,
            reason,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helgo_core::test_support::{fixed_freshness, place, zurich_catalog};
    use helgo_core::{Cuisine, Vibe, Weather};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    #[fixture]
    fn noon() -> RecommendationContext {
        RecommendationContext::at(datetime!(2025-07-15 12:00 UTC))
    }

    #[rstest]
    #[case("", false)]
    #[case("pizza", false)]
    #[case("Looking for dinner", true)]
    #[case("a quiet spot with a view over the lake", true)]
    #[case("Somewhere", true)]
    fn detects_natural_language(#[case] text: &str, #[case] expected: bool) {
        let intent = Intent {
            raw_text: text.to_owned(),
            ..Intent::default()
        };
        assert_eq!(is_natural_language(&intent), expected);
    }

    #[rstest]
    fn structured_fields_suppress_natural_language() {
        let intent = Intent {
            cuisines: vec![Cuisine::Italian],
            raw_text: "I'd like something italian and cozy tonight".to_owned(),
            ..Intent::default()
        };
        assert!(!is_natural_language(&intent));
    }

    #[rstest]
    fn cuisine_and_vibe_widen_the_base_gap() {
        let tags = ["italian", "cozy", "a", "b", "c", "d"];
        let matching = place("m", Category::Restaurant, 47.37, 8.54, &tags);
        let neither = place("n", Category::Restaurant, 47.37, 8.54, &["u", "v", "w", "x", "y", "z"]);
        let intent = Intent {
            cuisines: vec![Cuisine::Italian],
            vibes: vec![Vibe::Cozy],
            ..Intent::default()
        };
        let gap = base_score(&matching, &intent) - base_score(&neither, &intent);
        assert!((gap - 55.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(IndoorPreference::Indoor, Setting::Indoor, 20.0)]
    #[case(IndoorPreference::Indoor, Setting::Mixed, 10.0)]
    #[case(IndoorPreference::Indoor, Setting::Outdoor, -10.0)]
    #[case(IndoorPreference::Mixed, Setting::Mixed, 20.0)]
    #[case(IndoorPreference::Mixed, Setting::Outdoor, 10.0)]
    #[case(IndoorPreference::NoPreference, Setting::Outdoor, 0.0)]
    fn indoor_preference(
        #[case] preference: IndoorPreference,
        #[case] setting: Setting,
        #[case] expected: f64,
    ) {
        assert!((indoor_preference_score(setting, preference) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(60, 15.0)]
    #[case(110, 5.0)]
    #[case(200, -5.0)]
    fn time_budget_fit(#[case] budget: u16, #[case] expected: f64) {
        let bare = place("p", Category::Museum, 47.37, 8.54, &[]).with_duration(70);
        let intent = Intent {
            time_budget_mins: Some(budget),
            ..Intent::default()
        };
        assert!((base_score(&bare, &intent) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn focused_photo_mode_penalises_plain_places() {
        let intent = Intent {
            photo_mode: PhotoMode::Focused,
            ..Intent::default()
        };
        let plain = place("p", Category::Shopping, 47.37, 8.54, &[]);
        let view = place("v", Category::Viewpoint, 47.37, 8.54, &[]);
        assert!((base_score(&plain, &intent) + 10.0).abs() < f64::EPSILON);
        assert!((base_score(&view, &intent) - 25.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn rain_favours_indoor_places(noon: RecommendationContext) {
        let wet = noon.with_weather(Weather {
            precipitation_mm: 3.0,
            ..Weather::default()
        });
        let indoor = place("i", Category::Museum, 47.37, 8.54, &[]).with_setting(Setting::Indoor);
        let outdoor = place("o", Category::Park, 47.37, 8.54, &[]).with_setting(Setting::Outdoor);
        let intent = Intent::default();
        assert!((context_score(&indoor, &intent, &wet) - 15.0).abs() < f64::EPSILON);
        assert!(context_score(&outdoor, &intent, &wet).abs() < f64::EPSILON);
    }

    #[rstest]
    fn closed_and_out_of_season_places_sink() {
        let winter = RecommendationContext::at(datetime!(2025-01-15 12:00 UTC));
        let mut lido = zurich_catalog()
            .into_iter()
            .find(|candidate| candidate.id.as_str() == "seebad-utoquai")
            .expect("fixture place");
        lido.closed = true;
        // −50 closed, 0 popularity, −15 season, +10 dry outdoor.
        assert!((context_score(&lido, &Intent::default(), &winter) + 55.0).abs() < 1e-12);
    }

    #[rstest]
    fn nearby_places_gain_distance_bonus(noon: RecommendationContext) {
        let here = place("h", Category::Park, 47.37, 8.54, &[]).with_setting(Setting::Mixed);
        let located = noon.clone().with_user_location(here.location);
        let intent = Intent::default();
        let gain = context_score(&here, &intent, &located) - context_score(&here, &intent, &noon);
        assert!((gain - 25.0).abs() < 1e-9);
    }

    #[rstest]
    fn pipeline_blends_weighted_signals(noon: RecommendationContext) {
        let places = zurich_catalog();
        let indices = IndexSet::build(places.clone(), fixed_freshness());
        let intent = Intent {
            vibes: vec![Vibe::Cozy],
            raw_text: "cozy italian dinner".to_owned(),
            ..Intent::default()
        };
        let session = SessionState::new();
        let config = ScoringConfig::default();
        let pipeline = ScoringPipeline::new(&indices, &intent, &noon, &session, &config, None);
        assert!(matches!(pipeline.query(), QuerySignal::Lexical(_)));

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let osteria = places.get(2).expect("fixture place");
        let scored = pipeline.score(osteria, &mut rng);
        assert!((scored.score - scored.breakdown.total()).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&scored.confidence));
        assert!((scored.novelty - 1.0).abs() < f64::EPSILON);
        assert!(scored.breakdown.semantic > 0.0);
    }

    #[rstest]
    fn embedding_query_replaces_lexical_scoring(noon: RecommendationContext) {
        let places = zurich_catalog();
        let indices = IndexSet::build(places.clone(), fixed_freshness());
        let intent = Intent::default();
        let session = SessionState::new();
        let config = ScoringConfig::default();
        let query = [1.0_f32, 0.0, 0.0];
        let pipeline =
            ScoringPipeline::new(&indices, &intent, &noon, &session, &config, Some(&query));
        assert!(matches!(pipeline.query(), QuerySignal::Embedding(_)));
        let odeon = places.first().expect("fixture place");
        let sushi = places.get(4).expect("fixture place");
        assert!(pipeline.semantic_score(odeon) > 90.0);
        assert!(pipeline.semantic_score(sushi).abs() < f64::EPSILON);
    }

    #[rstest]
    fn mismatched_query_embedding_falls_back_to_lexical(noon: RecommendationContext) {
        let indices = IndexSet::build(zurich_catalog(), fixed_freshness());
        let intent = Intent::default();
        let session = SessionState::new();
        let config = ScoringConfig::default();
        let query = [1.0_f32, 0.0];
        let pipeline =
            ScoringPipeline::new(&indices, &intent, &noon, &session, &config, Some(&query));
        assert!(matches!(pipeline.query(), QuerySignal::Lexical(_)));
    }

    #[rstest]
    fn shown_places_have_no_novelty() {
        let cafe = place("c", Category::Cafe, 47.37, 8.54, &[]);
        let mut session = SessionState::new();
        session.record_shown_places([&cafe]);
        let scored = ScoredPlace::new(
            cafe,
            ScoreBreakdown::default(),
            150.0,
            &session,
            String::new(),
        );
        assert!(scored.novelty.abs() < f64::EPSILON);
        assert!((scored.confidence - 1.0).abs() < f64::EPSILON);
    }
}
