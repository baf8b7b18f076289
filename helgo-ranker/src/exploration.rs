//! Thompson sampling and softmax stochastic selection.
//!
//! Every function takes the random source explicitly so callers can pin
//! outcomes with a seeded generator.

#![expect(
    clippy::float_arithmetic,
    reason = "sampling algorithms are floating-point by nature"
)]

use helgo_core::Place;
use rand::Rng;
use rand::distributions::{Open01, Standard};
use rand_distr::StandardNormal;

use crate::session::{BetaPrior, SessionState};

/// Lowest softmax temperature accepted.
pub const MIN_TEMPERATURE: f64 = 0.1;

/// Weight of the category draw in the exploration score.
const CATEGORY_WEIGHT: f64 = 0.7;
/// Weight of the mean tag draw in the exploration score.
const TAG_WEIGHT: f64 = 0.3;

/// Upper bound on Marsaglia–Tsang rejections before settling on the mean.
const MAX_REJECTIONS: usize = 1_000;

/// Draw from Gamma(`shape`, 1).
///
/// Uses Marsaglia–Tsang squeeze rejection for `shape >= 1`. Smaller shapes
/// are boosted once via `Gamma(a) = Gamma(a + 1) · U^(1/a)`, so there is no
/// recursion however close `shape` gets to zero. Non-positive or non-finite
/// shapes yield `0.0`.
///
/// # Examples
/// ```
/// use helgo_ranker::sample_gamma;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// assert!(sample_gamma(2.5, &mut rng) > 0.0);
/// assert_eq!(sample_gamma(-1.0, &mut rng), 0.0);
/// ```
pub fn sample_gamma<R: Rng + ?Sized>(shape: f64, rng: &mut R) -> f64 {
    if !shape.is_finite() || shape <= 0.0 {
        return 0.0;
    }
    let (alpha, boost) = if shape < 1.0 {
        let u: f64 = rng.sample(Open01);
        (shape + 1.0, u.powf(1.0 / shape))
    } else {
        (shape, 1.0)
    };

    let d = alpha - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    for _ in 0..MAX_REJECTIONS {
        let x: f64 = rng.sample(StandardNormal);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let cubed = v * v * v;
        let u: f64 = rng.sample(Open01);
        let x2 = x * x;
        if u < 1.0 - 0.0331 * x2 * x2 || u.ln() < 0.5 * x2 + d * (1.0 - cubed + cubed.ln()) {
            return d * cubed * boost;
        }
    }
    log::debug!("gamma sampler hit the rejection bound for shape {shape}");
    alpha * boost
}

/// Draw from Beta(α, β) as `X / (X + Y)` with `X ~ Gamma(α)` and
/// `Y ~ Gamma(β)`. Returns `0.5` when both draws are zero.
pub fn sample_beta<R: Rng + ?Sized>(prior: BetaPrior, rng: &mut R) -> f64 {
    let x = sample_gamma(prior.alpha, rng);
    let y = sample_gamma(prior.beta, rng);
    let total = x + y;
    if total <= 0.0 {
        return 0.5;
    }
    x / total
}

/// Thompson-sampled exploration score on `0..=100`.
///
/// Combines one draw from the category belief (70 %) with the mean of one
/// draw per tag (30 %). Untagged places reuse the category draw for the tag
/// term.
#[expect(clippy::cast_precision_loss, reason = "tag counts are small")]
pub fn exploration_score<R: Rng + ?Sized>(
    place: &Place,
    session: &SessionState,
    rng: &mut R,
) -> f64 {
    let category = sample_beta(session.category_prior(place.category), rng);
    let tags = if place.tags.is_empty() {
        category
    } else {
        let total: f64 = place
            .tags
            .iter()
            .map(|tag| sample_beta(session.tag_prior(tag.as_str()), rng))
            .sum();
        total / place.tags.len() as f64
    };
    100.0 * (CATEGORY_WEIGHT * category + TAG_WEIGHT * tags)
}

/// Draw up to `count` items without replacement with probability
/// proportional to `exp((score - max) / temperature)`.
///
/// Probabilities are recomputed over the remaining pool after every draw.
/// The temperature is floored at [`MIN_TEMPERATURE`]. Items are returned in
/// draw order.
///
/// # Examples
/// ```
/// use helgo_ranker::softmax_select;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let picked = softmax_select(vec![("a", 1.0), ("b", 0.5), ("c", 0.1)], 2, 0.2, &mut rng);
/// assert_eq!(picked.len(), 2);
/// ```
pub fn softmax_select<T, R: Rng + ?Sized>(
    candidates: Vec<(T, f64)>,
    count: usize,
    temperature: f64,
    rng: &mut R,
) -> Vec<T> {
    let effective = if temperature.is_finite() {
        temperature.max(MIN_TEMPERATURE)
    } else {
        MIN_TEMPERATURE
    };
    let mut pool = candidates;
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count && !pool.is_empty() {
        let slot = draw_slot(&pool, effective, rng);
        picked.push(pool.remove(slot).0);
    }
    picked
}

fn draw_slot<T, R: Rng + ?Sized>(pool: &[(T, f64)], temperature: f64, rng: &mut R) -> usize {
    let max = pool
        .iter()
        .map(|(_, score)| *score)
        .filter(|score| score.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return 0;
    }
    let weights: Vec<f64> = pool
        .iter()
        .map(|(_, score)| {
            if score.is_finite() {
                ((score - max) / temperature).exp()
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = weights.iter().sum();
    let threshold = rng.sample::<f64, _>(Standard) * total;
    let mut cumulative = 0.0;
    for (slot, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if threshold < cumulative {
            return slot;
        }
    }
    // Rounding can leave the threshold at the very top of the range.
    weights
        .iter()
        .rposition(|weight| *weight > 0.0)
        .unwrap_or(0)
}
