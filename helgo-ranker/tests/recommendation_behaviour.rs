#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for itinerary recommendation.

use std::cell::RefCell;

use geo::Coord;
use helgo_core::test_support::{fixed_freshness, zurich_catalog};
use helgo_core::{AreaFilter, Cuisine, Intent, RecommendationContext, haversine_km};
use helgo_ranker::{
    Engine, EngineConfig, Itinerary, RecommendOptions, RecommendationError, SessionState,
    filter_candidates,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use time::macros::datetime;

const SEEFELD: Coord<f64> = Coord { x: 8.5520, y: 47.3560 };

/// Aggregate fixtures shared across the BDD scenarios.
pub struct TestContext {
    engine: RefCell<Option<Engine>>,
    intent: RefCell<Intent>,
    outcome: RefCell<Option<Result<Vec<Itinerary>, RecommendationError>>>,
    candidates: RefCell<Vec<usize>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        engine: RefCell::new(None),
        intent: RefCell::new(Intent::default()),
        outcome: RefCell::new(None),
        candidates: RefCell::new(Vec::new()),
    }
}

fn summer_evening() -> RecommendationContext {
    RecommendationContext::at(datetime!(2025-07-15 19:00 +02:00))
}

fn seeded_engine() -> Engine {
    Engine::with_rng(EngineConfig::default(), ChaCha8Rng::seed_from_u64(42))
        .expect("default config is valid")
}

#[given("an engine indexed with the Zurich catalog")]
fn indexed_engine(context: &TestContext) {
    let engine = seeded_engine();
    assert!(engine.build_indices(zurich_catalog(), fixed_freshness()));
    *context.engine.borrow_mut() = Some(engine);
}

#[given("an engine without a catalog")]
fn empty_engine(context: &TestContext) {
    *context.engine.borrow_mut() = Some(seeded_engine());
}

#[given("a request for turkish food")]
fn turkish_request(context: &TestContext) {
    *context.intent.borrow_mut() = Intent {
        cuisines: vec![Cuisine::Turkish],
        raw_text: "turkish".to_owned(),
        ..Intent::default()
    };
}

#[given("a request for anything within 1 km of Seefeld")]
fn seefeld_request(context: &TestContext) {
    let area = AreaFilter::around("Seefeld", SEEFELD, 1.0).expect("valid area");
    *context.intent.borrow_mut() = Intent {
        area: Some(area),
        ..Intent::default()
    };
}

#[when("itineraries are generated")]
fn generate(context: &TestContext) {
    let guard = context.engine.borrow();
    let engine = guard.as_ref().expect("engine should be configured");
    let outcome = engine.generate_itineraries(
        &context.intent.borrow(),
        &summer_evening(),
        &RecommendOptions::default(),
    );
    *context.outcome.borrow_mut() = Some(outcome);
}

#[when("greeting itineraries are generated")]
fn generate_greeting(context: &TestContext) {
    let guard = context.engine.borrow();
    let engine = guard.as_ref().expect("engine should be configured");
    let outcome =
        engine.generate_greeting_itineraries(&summer_evening(), &RecommendOptions::default());
    *context.outcome.borrow_mut() = Some(outcome);
}

#[when("the candidates are filtered")]
fn filter(context: &TestContext) {
    let guard = context.engine.borrow();
    let engine = guard.as_ref().expect("engine should be configured");
    let slots = filter_candidates(
        &engine.indices(),
        &context.intent.borrow(),
        &SessionState::new(),
    )
    .expect("area should match after widening");
    *context.candidates.borrow_mut() = slots;
}

fn error(context: &TestContext) -> RecommendationError {
    context
        .outcome
        .take()
        .expect("itineraries should have been requested")
        .expect_err("request should fail")
}

fn itineraries(context: &TestContext) -> Vec<Itinerary> {
    context
        .outcome
        .borrow()
        .as_ref()
        .expect("itineraries should have been requested")
        .as_ref()
        .expect("request should succeed")
        .clone()
}

#[then("the request fails with no cuisine match")]
fn no_cuisine_match(context: &TestContext) {
    let outcome = context.outcome.borrow();
    let result = outcome.as_ref().expect("itineraries should have been requested");
    assert!(matches!(
        result,
        Err(RecommendationError::NoCuisineMatch { .. })
    ));
}

#[then("the error names turkish")]
fn names_turkish(context: &TestContext) {
    let err = error(context);
    assert!(err.to_string().contains("turkish"), "got {err}");
}

#[then("at least 3 candidates remain")]
fn enough_candidates(context: &TestContext) {
    assert!(context.candidates.borrow().len() >= 3);
}

#[then("some candidate lies between 1 and 2 km from Seefeld")]
fn widened(context: &TestContext) {
    let engine = context.engine.borrow();
    let indices = engine.as_ref().expect("engine should be configured").indices();
    let distances: Vec<f64> = context
        .candidates
        .borrow()
        .iter()
        .filter_map(|slot| indices.place(*slot))
        .map(|place| haversine_km(SEEFELD, place.location))
        .collect();
    assert!(distances.iter().all(|km| *km <= 2.0));
    assert!(distances.iter().any(|km| *km > 1.0));
}

#[then("3 itineraries are returned")]
fn three_itineraries(context: &TestContext) {
    assert_eq!(itineraries(context).len(), 3);
}

#[then("no anchor is its own satellite")]
fn distinct_pairs(context: &TestContext) {
    for itinerary in itineraries(context) {
        assert_ne!(itinerary.anchor.place.id, itinerary.satellite.place.id);
    }
}

#[then("every recommended place is remembered as shown")]
fn remembered(context: &TestContext) {
    let guard = context.engine.borrow();
    let engine = guard.as_ref().expect("engine should be configured");
    let session = engine.session_snapshot(&RecommendOptions::default().session);
    for itinerary in itineraries(context) {
        assert!(session.has_shown(&itinerary.anchor.place.id));
        assert!(session.has_shown(&itinerary.satellite.place.id));
    }
}

#[then("the request fails because no catalog is indexed")]
fn not_indexed(context: &TestContext) {
    assert!(matches!(error(context), RecommendationError::IndexNotBuilt));
}

#[scenario(path = "tests/features/recommendation.feature", index = 0)]
fn unknown_cuisine_is_named(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommendation.feature", index = 1)]
fn sparse_area_widens(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommendation.feature", index = 2)]
fn greeting_itineraries(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/recommendation.feature", index = 3)]
fn unindexed_engine(context: TestContext) {
    let _ = context;
}
