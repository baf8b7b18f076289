//! Candidate filtering, anchor selection and satellite pairing.
//!
//! Selection runs in four stages:
//! 1. filter the catalog by exposure, category, cuisine and area;
//! 2. score the survivors, by distance alone for strict requests with a
//!    reference point, otherwise through the [`ScoringPipeline`];
//! 3. pick anchors: softmax-sample the top of the ranking, diversify with
//!    MMR, then top up from the ranking;
//! 4. pair each anchor with the best-scoring nearby satellite.

#![expect(
    clippy::float_arithmetic,
    reason = "selection compares and rescales floating-point scores"
)]

use geo::Coord;
use helgo_core::{
    Category, Intent, ItineraryMetrics, Place, RecommendationContext, haversine_km,
};
use rand::Rng;
use serde::Serialize;

use crate::config::{EngineConfig, ScoringConfig};
use crate::diversity::{experiential_distance, is_too_similar, mmr_select};
use crate::error::RecommendationError;
use crate::exploration::softmax_select;
use crate::indices::IndexSet;
use crate::reasons::{distance_reason, satellite_reason};
use crate::scoring::{ScoreBreakdown, ScoredPlace, ScoringPipeline, is_natural_language};
use crate::session::SessionState;

/// Unseen places needed before shown places are dropped.
const MIN_UNSEEN: usize = 3;
/// Area results below this count trigger one radius doubling.
const MIN_AREA_RESULTS: usize = 3;

/// An anchor place with a satellite to visit alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    /// Main recommendation.
    pub anchor: ScoredPlace,
    /// Companion stop near the anchor.
    pub satellite: ScoredPlace,
    /// Situational metrics for the anchor, when a metrics collaborator is
    /// configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ItineraryMetrics>,
}

/// Everything one selection run reads.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Current indices.
    pub indices: &'a IndexSet,
    /// Parsed request.
    pub intent: &'a Intent,
    /// Situation.
    pub context: &'a RecommendationContext,
    /// The caller's session.
    pub session: &'a SessionState,
    /// Engine tuning.
    pub config: &'a EngineConfig,
    /// Maximum number of itineraries.
    pub limit: usize,
    /// Optional query embedding.
    pub query_embedding: Option<&'a [f32]>,
}

/// Produce up to `request.limit` itineraries.
///
/// # Errors
/// Returns [`RecommendationError::NoCuisineMatch`] or
/// [`RecommendationError::NoAreaMatch`] when filtering leaves nothing, and
/// [`RecommendationError::NoCandidates`] when no anchor could be paired.
pub fn recommend<R: Rng + ?Sized>(
    request: &SelectionRequest<'_>,
    rng: &mut R,
) -> Result<Vec<Itinerary>, RecommendationError> {
    let candidates = filter_candidates(request.indices, request.intent, request.session)?;
    if candidates.is_empty() {
        return Err(RecommendationError::NoCandidates);
    }

    let scoring = request
        .config
        .scoring_for(is_natural_language(request.intent));
    let pipeline = ScoringPipeline::new(
        request.indices,
        request.intent,
        request.context,
        request.session,
        scoring,
        request.query_embedding,
    );
    let ranked = rank(request, &pipeline, &candidates, rng);
    let anchors = select_anchors(&ranked, request.limit.max(1), request.config, scoring, rng);
    log::debug!(
        "selected {} anchors from {} candidates",
        anchors.len(),
        ranked.len()
    );

    let itineraries: Vec<Itinerary> = anchors
        .into_iter()
        .filter_map(|slot| ranked.get(slot))
        .filter_map(|anchor| {
            select_satellite(
                &anchor.place,
                request.indices,
                &pipeline,
                request.config.satellite_radius_km,
                rng,
            )
            .map(|satellite| Itinerary {
                anchor: anchor.clone(),
                satellite,
                metrics: None,
            })
        })
        .collect();
    if itineraries.is_empty() {
        return Err(RecommendationError::NoCandidates);
    }
    Ok(itineraries)
}

/// Catalog slots that survive exposure, category, cuisine and area
/// filtering, in catalog order.
///
/// # Errors
/// Returns [`RecommendationError::NoCuisineMatch`] when no restaurant
/// serves a requested cuisine and [`RecommendationError::NoAreaMatch`] when
/// nothing lies in the requested area even after doubling its radius.
pub fn filter_candidates(
    indices: &IndexSet,
    intent: &Intent,
    session: &SessionState,
) -> Result<Vec<usize>, RecommendationError> {
    let all: Vec<usize> = (0..indices.len()).collect();
    let unseen: Vec<usize> = all
        .iter()
        .copied()
        .filter(|slot| {
            indices
                .place(*slot)
                .is_some_and(|place| !session.has_shown(&place.id))
        })
        .collect();
    let mut slots = if unseen.len() >= MIN_UNSEEN { unseen } else { all };

    if !intent.categories.is_empty() && intent.is_strict_category_or_location() {
        slots.retain(|slot| {
            indices
                .place(*slot)
                .is_some_and(|place| intent.wants_category(place.category))
        });
    }

    if !intent.cuisines.is_empty() {
        slots.retain(|slot| {
            indices
                .place(*slot)
                .is_some_and(|place| serves_requested_cuisine(place, intent))
        });
        if slots.is_empty() {
            let cuisine = intent
                .cuisines
                .iter()
                .map(|cuisine| cuisine.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RecommendationError::NoCuisineMatch { cuisine });
        }
    }

    if let Some(area) = &intent.area {
        let by_postal: Vec<usize> = slots
            .iter()
            .copied()
            .filter(|slot| {
                indices
                    .place(*slot)
                    .is_some_and(|place| area.matches_postal_code(place))
            })
            .collect();
        let in_area = if by_postal.is_empty() {
            area.center.map_or_else(Vec::new, |center| {
                within_area(indices, &slots, center, area.radius_km, &area.name)
            })
        } else {
            by_postal
        };
        if in_area.is_empty() {
            return Err(RecommendationError::NoAreaMatch {
                area: area.name.clone(),
            });
        }
        slots = in_area;
    }
    Ok(slots)
}

fn serves_requested_cuisine(place: &Place, intent: &Intent) -> bool {
    let serves_food = place.category == Category::Restaurant
        || (place.category == Category::Cafe && intent.wants_coffee());
    serves_food
        && intent
            .cuisines
            .iter()
            .any(|cuisine| place.has_tag(cuisine.as_str()))
}

fn within_area(
    indices: &IndexSet,
    slots: &[usize],
    center: Coord<f64>,
    radius_km: f64,
    name: &str,
) -> Vec<usize> {
    let within = |radius: f64| -> Vec<usize> {
        slots
            .iter()
            .copied()
            .filter(|slot| {
                indices
                    .place(*slot)
                    .is_some_and(|place| haversine_km(center, place.location) <= radius)
            })
            .collect()
    };
    let first = within(radius_km);
    if first.len() >= MIN_AREA_RESULTS {
        return first;
    }
    let widened = radius_km * 2.0;
    log::debug!(
        "only {} places within {radius_km} km of {name}; widening to {widened} km",
        first.len()
    );
    within(widened)
}

/// Score the candidates and sort them best first, keeping catalog order
/// among equal scores.
fn rank<R: Rng + ?Sized>(
    request: &SelectionRequest<'_>,
    pipeline: &ScoringPipeline<'_>,
    candidates: &[usize],
    rng: &mut R,
) -> Vec<ScoredPlace> {
    let places = candidates
        .iter()
        .filter_map(|slot| request.indices.place(*slot));
    let reference = if request.intent.is_strict_category_or_location() {
        request.context.user_location.or_else(|| {
            request
                .intent
                .area
                .as_ref()
                .and_then(|area| area.center)
        })
    } else {
        None
    };

    let mut ranked: Vec<ScoredPlace> = match reference {
        Some(origin) => places
            .map(|place| {
                let km = haversine_km(origin, place.location);
                ScoredPlace::new(
                    place.clone(),
                    ScoreBreakdown::default(),
                    distance_score(km),
                    request.session,
                    distance_reason(km),
                )
            })
            .collect(),
        None => places.map(|place| pipeline.score(place, rng)).collect(),
    };
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// `max(0, 100 − 20 · km)`.
///
/// # Examples
/// ```
/// use helgo_ranker::distance_score;
///
/// assert_eq!(distance_score(0.0), 100.0);
/// assert_eq!(distance_score(2.5), 50.0);
/// assert_eq!(distance_score(9.0), 0.0);
/// ```
#[must_use]
pub fn distance_score(distance_km: f64) -> f64 {
    (100.0 - 20.0 * distance_km).max(0.0)
}

/// Pick up to `limit` anchors from `ranked`, returning positions in
/// `ranked`.
///
/// The top `anchor_pool` entries are softmax-sampled down to
/// `softmax_sample` using scores normalised by the pool maximum, then MMR
/// with experiential similarity trims the sample to `limit`.
/// [`ScoringConfig::temperature`] therefore acts on `[0, 1]` scores, not on
/// raw pipeline totals: 0.15 already strongly favours the best few places
/// while values near 1 flatten the draw.
///
/// Short results are topped up from the ranking, first skipping
/// near-duplicates of the picks, then without that gate.
pub fn select_anchors<R: Rng + ?Sized>(
    ranked: &[ScoredPlace],
    limit: usize,
    config: &EngineConfig,
    scoring: &ScoringConfig,
    rng: &mut R,
) -> Vec<usize> {
    let pool_max = ranked
        .iter()
        .take(config.anchor_pool)
        .map(|scored| scored.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let weighted: Vec<(usize, f64)> = ranked
        .iter()
        .take(config.anchor_pool)
        .enumerate()
        .map(|(slot, scored)| {
            let normalised = if pool_max > 0.0 {
                scored.score / pool_max
            } else {
                scored.score
            };
            (slot, normalised)
        })
        .collect();
    let sampled: Vec<(usize, f64)> =
        softmax_select(weighted, config.softmax_sample, scoring.temperature, rng)
            .into_iter()
            .filter_map(|slot| ranked.get(slot).map(|scored| (slot, scored.score)))
            .collect();

    let mut picked = mmr_select(sampled, limit, scoring.mmr_lambda, |a, b| {
        match (ranked.get(*a), ranked.get(*b)) {
            (Some(left), Some(right)) => 1.0 - experiential_distance(&left.place, &right.place),
            _ => 0.0,
        }
    });

    for gated in [true, false] {
        for (slot, candidate) in ranked.iter().enumerate() {
            if picked.len() >= limit {
                return picked;
            }
            if picked.contains(&slot) {
                continue;
            }
            let duplicate = gated
                && picked
                    .iter()
                    .filter_map(|chosen| ranked.get(*chosen))
                    .any(|chosen| {
                        is_too_similar(&candidate.place, &chosen.place, scoring.similarity_threshold)
                    });
            if !duplicate {
                picked.push(slot);
            }
        }
    }
    picked
}

/// Choose the satellite for `anchor`, or `None` when no other place exists.
///
/// Candidates are the places within `radius_km` of the anchor, or every
/// other place when none are that close. Restaurant anchors prefer
/// non-restaurants with at most one shared tag, then any non-restaurant.
/// Each candidate scores its pipeline score plus `max(0, 20 − 15 · km)`, 8
/// for a different category and 5 for sharing at most two tags.
pub fn select_satellite<R: Rng + ?Sized>(
    anchor: &Place,
    indices: &IndexSet,
    pipeline: &ScoringPipeline<'_>,
    radius_km: f64,
    rng: &mut R,
) -> Option<ScoredPlace> {
    let nearby: Vec<&Place> = indices
        .spatial()
        .within_km(anchor.location, radius_km)
        .into_iter()
        .filter_map(|slot| indices.place(slot))
        .filter(|place| place.id != anchor.id)
        .collect();
    let pool = if nearby.is_empty() {
        indices
            .places()
            .iter()
            .filter(|place| place.id != anchor.id)
            .collect()
    } else {
        nearby
    };
    let preferred = if anchor.category == Category::Restaurant {
        restaurant_companions(anchor, pool)
    } else {
        pool
    };

    let mut best: Option<(&Place, ScoreBreakdown, f64)> = None;
    for candidate in preferred {
        let breakdown = pipeline.breakdown(candidate, rng);
        let total = breakdown.total() + satellite_bonus(anchor, candidate);
        if best.is_none_or(|(_, _, top)| total > top) {
            best = Some((candidate, breakdown, total));
        }
    }
    best.map(|(place, breakdown, total)| {
        ScoredPlace::new(
            place.clone(),
            breakdown,
            total,
            pipeline.session(),
            satellite_reason(place, pipeline.context()),
        )
    })
}

fn restaurant_companions<'p>(anchor: &Place, pool: Vec<&'p Place>) -> Vec<&'p Place> {
    let non_restaurants: Vec<&Place> = pool
        .iter()
        .copied()
        .filter(|place| place.category != Category::Restaurant)
        .collect();
    let distinct: Vec<&Place> = non_restaurants
        .iter()
        .copied()
        .filter(|place| anchor.shared_tag_count(place) <= 1)
        .collect();
    if !distinct.is_empty() {
        distinct
    } else if !non_restaurants.is_empty() {
        non_restaurants
    } else {
        pool
    }
}

fn satellite_bonus(anchor: &Place, candidate: &Place) -> f64 {
    let proximity = (20.0 - 15.0 * anchor.distance_km(candidate)).max(0.0);
    let contrast = if anchor.category == candidate.category {
        0.0
    } else {
        8.0
    };
    let freshness = if anchor.shared_tag_count(candidate) <= 2 {
        5.0
    } else {
        0.0
    };
    proximity + contrast + freshness
}

#[cfg(test)]
mod tests {
    use super::*;
    use helgo_core::test_support::{fixed_freshness, place, zurich_catalog};
    use helgo_core::{AreaFilter, Cuisine, PlaceId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    #[fixture]
    fn indices() -> IndexSet {
        IndexSet::build(zurich_catalog(), fixed_freshness())
    }

    #[fixture]
    fn noon() -> RecommendationContext {
        RecommendationContext::at(datetime!(2025-07-15 12:00 UTC))
    }

    fn ids(indices: &IndexSet, slots: &[usize]) -> Vec<String> {
        slots
            .iter()
            .filter_map(|slot| indices.place(*slot))
            .map(|place| place.id.as_str().to_owned())
            .collect()
    }

    #[rstest]
    fn unknown_cuisine_names_the_cuisine(indices: IndexSet) {
        let intent = Intent {
            cuisines: vec![Cuisine::Turkish],
            ..Intent::default()
        };
        let err = filter_candidates(&indices, &intent, &SessionState::new())
            .expect_err("no turkish restaurants");
        match err {
            RecommendationError::NoCuisineMatch { cuisine } => assert_eq!(cuisine, "turkish"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[rstest]
    fn cuisine_filter_keeps_tagged_restaurants(indices: IndexSet) {
        let intent = Intent {
            cuisines: vec![Cuisine::Italian],
            ..Intent::default()
        };
        let slots = filter_candidates(&indices, &intent, &SessionState::new()).expect("matches");
        assert_eq!(
            ids(&indices, &slots),
            vec!["osteria-della-nonna", "trattoria-limmat"]
        );
    }

    #[rstest]
    fn coffee_admits_cafes(indices: IndexSet) {
        let intent = Intent {
            cuisines: vec![Cuisine::Coffee],
            ..Intent::default()
        };
        let slots = filter_candidates(&indices, &intent, &SessionState::new()).expect("matches");
        assert_eq!(ids(&indices, &slots), vec!["cafe-odeon"]);
    }

    #[rstest]
    fn sparse_area_doubles_its_radius(indices: IndexSet) {
        let seefeld = AreaFilter::around("Seefeld", Coord { x: 8.5520, y: 47.3560 }, 1.0)
            .expect("valid area");
        let intent = Intent {
            area: Some(seefeld),
            ..Intent::default()
        };
        let slots = filter_candidates(&indices, &intent, &SessionState::new()).expect("matches");
        assert!(slots.len() >= 3, "got {:?}", ids(&indices, &slots));
    }

    #[rstest]
    fn postal_codes_take_precedence(indices: IndexSet) {
        let intent = Intent {
            area: Some(AreaFilter {
                name: "Kreis 5".to_owned(),
                postal_codes: vec!["8005".to_owned()],
                center: None,
                radius_km: 1.0,
            }),
            ..Intent::default()
        };
        let slots = filter_candidates(&indices, &intent, &SessionState::new()).expect("matches");
        assert_eq!(ids(&indices, &slots), vec!["markthalle", "viadukt-shops"]);
    }

    #[rstest]
    fn empty_area_names_the_area(indices: IndexSet) {
        let nowhere = AreaFilter::around("Bern", Coord { x: 7.44, y: 46.95 }, 1.0)
            .expect("valid area");
        let intent = Intent {
            area: Some(nowhere),
            ..Intent::default()
        };
        let err = filter_candidates(&indices, &intent, &SessionState::new())
            .expect_err("nothing in Bern");
        assert_eq!(err.to_string(), "no places found in Bern");
    }

    #[rstest]
    fn strict_category_requests_restrict_categories(indices: IndexSet) {
        let intent = Intent {
            categories: vec![Category::Viewpoint],
            ..Intent::default()
        };
        let slots = filter_candidates(&indices, &intent, &SessionState::new()).expect("matches");
        assert_eq!(ids(&indices, &slots), vec!["lindenhof", "uetliberg"]);
    }

    #[rstest]
    fn shown_places_drop_out_while_enough_remain(indices: IndexSet) {
        let mut session = SessionState::new();
        session.record_shown_places(indices.places().iter().take(11));
        let slots = filter_candidates(&indices, &Intent::default(), &session).expect("matches");
        assert_eq!(slots, vec![11, 12, 13]);

        session.record_shown_places(indices.places().iter().take(12));
        let all = filter_candidates(&indices, &Intent::default(), &session).expect("matches");
        assert_eq!(all.len(), indices.len());
    }

    #[rstest]
    fn strict_requests_rank_by_distance(indices: IndexSet, noon: RecommendationContext) {
        let lindenhof = indices
            .place(1)
            .expect("fixture place")
            .location;
        let context = noon.with_user_location(lindenhof);
        let intent = Intent {
            categories: vec![Category::Viewpoint],
            ..Intent::default()
        };
        let config = EngineConfig::default();
        let session = SessionState::new();
        let request = SelectionRequest {
            indices: &indices,
            intent: &intent,
            context: &context,
            session: &session,
            config: &config,
            limit: 3,
            query_embedding: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let itineraries = recommend(&request, &mut rng).expect("itineraries");
        let first = itineraries.first().expect("one itinerary");
        assert_eq!(first.anchor.place.id, PlaceId::from("lindenhof"));
        assert_eq!(first.anchor.reason, "0.0 km away");
        assert!((first.anchor.score - 100.0).abs() < 1e-9);
    }

    fn location_of(indices: &IndexSet, id: &str) -> Coord<f64> {
        indices
            .places()
            .iter()
            .find(|candidate| candidate.id.as_str() == id)
            .map(|candidate| candidate.location)
            .expect("fixture place")
    }

    fn first_anchor(
        indices: &IndexSet,
        intent: &Intent,
        context: &RecommendationContext,
    ) -> ScoredPlace {
        let config = EngineConfig::default();
        let session = SessionState::new();
        let request = SelectionRequest {
            indices,
            intent,
            context,
            session: &session,
            config: &config,
            limit: 3,
            query_embedding: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        recommend(&request, &mut rng)
            .expect("itineraries")
            .into_iter()
            .next()
            .map(|itinerary| itinerary.anchor)
            .expect("one itinerary")
    }

    #[rstest]
    fn category_with_cuisine_ranks_by_distance(indices: IndexSet, noon: RecommendationContext) {
        let context = noon.with_user_location(location_of(&indices, "osteria-della-nonna"));
        let intent = Intent {
            categories: vec![Category::Restaurant],
            cuisines: vec![Cuisine::Italian],
            ..Intent::default()
        };
        let anchor = first_anchor(&indices, &intent, &context);
        assert_eq!(anchor.place.id, PlaceId::from("osteria-della-nonna"));
        assert_eq!(anchor.reason, "0.0 km away");
        assert!((anchor.score - 100.0).abs() < 1e-9);
        assert_eq!(anchor.breakdown, ScoreBreakdown::default());
    }

    #[rstest]
    fn area_only_requests_measure_from_the_area_centre(
        indices: IndexSet,
        noon: RecommendationContext,
    ) {
        let centre = location_of(&indices, "lindenhof");
        let intent = Intent {
            area: Some(AreaFilter::around("Lindenhof", centre, 1.0).expect("valid area")),
            ..Intent::default()
        };
        assert!(noon.user_location.is_none());
        let anchor = first_anchor(&indices, &intent, &noon);
        assert_eq!(anchor.place.id, PlaceId::from("lindenhof"));
        assert_eq!(anchor.reason, "0.0 km away");
        assert!((anchor.score - 100.0).abs() < 1e-9);
    }

    #[rstest]
    fn anchors_are_distinct_and_limited(indices: IndexSet, noon: RecommendationContext) {
        let config = EngineConfig::default();
        let session = SessionState::new();
        let intent = Intent::default();
        let request = SelectionRequest {
            indices: &indices,
            intent: &intent,
            context: &noon,
            session: &session,
            config: &config,
            limit: 3,
            query_embedding: None,
        };
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let itineraries = recommend(&request, &mut rng).expect("itineraries");
            assert_eq!(itineraries.len(), 3);
            let mut anchors: Vec<&str> = itineraries
                .iter()
                .map(|itinerary| itinerary.anchor.place.id.as_str())
                .collect();
            anchors.sort_unstable();
            anchors.dedup();
            assert_eq!(anchors.len(), 3);
            for itinerary in &itineraries {
                assert_ne!(itinerary.anchor.place.id, itinerary.satellite.place.id);
            }
        }
    }

    #[rstest]
    fn fill_tops_up_short_samples(noon: RecommendationContext) {
        let places = zurich_catalog();
        let indices = IndexSet::build(places, fixed_freshness());
        let config = EngineConfig {
            softmax_sample: 1,
            ..EngineConfig::default()
        };
        let session = SessionState::new();
        let intent = Intent::default();
        let config_scoring = ScoringConfig::default();
        let pipeline = ScoringPipeline::new(&indices, &intent, &noon, &session, &config_scoring, None);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let ranked: Vec<ScoredPlace> = indices
            .places()
            .iter()
            .map(|candidate| pipeline.score(candidate, &mut rng))
            .collect();
        let picked = select_anchors(&ranked, 3, &config, &config_scoring, &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[rstest]
    fn restaurant_anchor_prefers_contrasting_satellite(noon: RecommendationContext) {
        let anchor = place("r", Category::Restaurant, 47.3700, 8.5400, &["italian", "cozy"]);
        let places = vec![
            anchor.clone(),
            place("r2", Category::Restaurant, 47.3701, 8.5401, &["thai"]),
            place("b", Category::Bar, 47.3702, 8.5402, &["italian", "cozy"]),
            place("w", Category::Walk, 47.3720, 8.5420, &["river"]),
        ];
        let indices = IndexSet::build(places, fixed_freshness());
        let intent = Intent::default();
        let session = SessionState::new();
        let scoring = ScoringConfig::default();
        let pipeline = ScoringPipeline::new(&indices, &intent, &noon, &session, &scoring, None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let satellite = select_satellite(&anchor, &indices, &pipeline, 1.0, &mut rng)
            .expect("satellite");
        assert_eq!(satellite.place.id, PlaceId::from("w"));
        assert_eq!(satellite.reason, "for a short stroll");
    }

    #[rstest]
    fn lone_place_has_no_satellite(noon: RecommendationContext) {
        let only = place("solo", Category::Park, 47.37, 8.54, &[]);
        let indices = IndexSet::build(vec![only.clone()], fixed_freshness());
        let intent = Intent::default();
        let session = SessionState::new();
        let scoring = ScoringConfig::default();
        let pipeline = ScoringPipeline::new(&indices, &intent, &noon, &session, &scoring, None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(select_satellite(&only, &indices, &pipeline, 1.0, &mut rng).is_none());
    }

    #[rstest]
    #[case(0.0, 33.0)]
    #[case(2.0, 13.0)]
    fn satellite_bonus_combines_proximity_and_contrast(#[case] km_north: f64, #[case] expected: f64) {
        let anchor = place("a", Category::Museum, 47.0, 8.0, &[]);
        let candidate = place("c", Category::Cafe, 47.0 + km_north / 111.195, 8.0, &[]);
        assert!((satellite_bonus(&anchor, &candidate) - expected).abs() < 1e-3);
    }
}
