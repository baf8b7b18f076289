//! Similarity measures and Maximal Marginal Relevance selection.

#![expect(
    clippy::float_arithmetic,
    reason = "similarity blending and MMR are floating-point"
)]

use std::collections::BTreeSet;

use helgo_core::{Place, Tag};

/// Kilometre scale of the geographic similarity term.
const GEO_SCALE_KM: f64 = 2.0;

/// Jaccard similarity of two tag sets; `0.0` when both are empty.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use helgo_core::Tag;
/// use helgo_ranker::jaccard_similarity;
///
/// let a: BTreeSet<Tag> = ["cozy", "wine"].into_iter().map(Tag::new).collect::<Result<_, _>>()?;
/// let b: BTreeSet<Tag> = ["cozy"].into_iter().map(Tag::new).collect::<Result<_, _>>()?;
/// assert_eq!(jaccard_similarity(&a, &b), 0.5);
/// # Ok::<(), helgo_core::PlaceError>(())
/// ```
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "tag counts are small")]
pub fn jaccard_similarity(a: &BTreeSet<Tag>, b: &BTreeSet<Tag>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn same_category(a: &Place, b: &Place) -> f64 {
    if a.category == b.category { 1.0 } else { 0.0 }
}

/// How different two outings feel, on `[0, 1]`.
///
/// `1 − (0.45 · tag Jaccard + 0.35 · same category + 0.2 · exp(−km / 2))`,
/// clamped.
#[must_use]
pub fn experiential_distance(a: &Place, b: &Place) -> f64 {
    let geo = (-a.distance_km(b) / GEO_SCALE_KM).exp();
    let similarity =
        0.45 * jaccard_similarity(&a.tags, &b.tags) + 0.35 * same_category(a, b) + 0.2 * geo;
    (1.0 - similarity).clamp(0.0, 1.0)
}

/// Near-duplicate gate: `0.6 · tag Jaccard + 0.4 · same category` reaches
/// `threshold`, or both places sit in the same named area. A place is always
/// too similar to itself.
#[must_use]
pub fn is_too_similar(a: &Place, b: &Place, threshold: f64) -> bool {
    if a.id == b.id {
        return true;
    }
    let shared_area = matches!((&a.area, &b.area), (Some(x), Some(y)) if x == y);
    let similarity = 0.6 * jaccard_similarity(&a.tags, &b.tags) + 0.4 * same_category(a, b);
    similarity >= threshold || shared_area
}

/// Greedy Maximal Marginal Relevance selection of up to `k` items.
///
/// Each step picks the remaining candidate maximising
/// `λ · (score / max_score) − (1 − λ) · max similarity to the picks so far`.
/// Ties go to the earliest candidate. A non-positive `max_score` is treated
/// as `1`.
///
/// # Examples
/// ```
/// use helgo_ranker::mmr_select;
///
/// let picked = mmr_select(vec![("a", 9.0), ("a2", 8.9), ("b", 5.0)], 2, 0.5, |x: &&str, y: &&str| {
///     if x.starts_with('a') && y.starts_with('a') { 1.0 } else { 0.0 }
/// });
/// assert_eq!(picked, vec!["a", "b"]);
/// ```
pub fn mmr_select<T, F>(candidates: Vec<(T, f64)>, k: usize, lambda: f64, similarity: F) -> Vec<T>
where
    F: Fn(&T, &T) -> f64,
{
    let max_score = candidates
        .iter()
        .map(|(_, score)| *score)
        .fold(f64::NEG_INFINITY, f64::max);
    let scale = if max_score > 0.0 { max_score } else { 1.0 };

    let mut remaining = candidates;
    let mut selected: Vec<T> = Vec::with_capacity(k.min(remaining.len()));
    while selected.len() < k && !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;
        for (slot, (candidate, score)) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|picked| similarity(candidate, picked))
                .fold(None, |acc: Option<f64>, value| {
                    Some(acc.map_or(value, |current| current.max(value)))
                })
                .unwrap_or(0.0);
            let marginal = lambda * (score / scale) - (1.0 - lambda) * redundancy;
            if best.is_none_or(|(_, top)| marginal > top) {
                best = Some((slot, marginal));
            }
        }
        let Some((slot, _)) = best else { break };
        selected.push(remaining.remove(slot).0);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use helgo_core::Category;
    use helgo_core::test_support::place;
    use rstest::rstest;

    #[rstest]
    fn jaccard_of_empty_sets_is_zero() {
        assert!(jaccard_similarity(&BTreeSet::new(), &BTreeSet::new()).abs() < f64::EPSILON);
    }

    #[rstest]
    fn identical_places_have_zero_distance() {
        let a = place("a", Category::Cafe, 47.37, 8.54, &["coffee"]);
        assert!(experiential_distance(&a, &a).abs() < 1e-12);
    }

    #[rstest]
    fn far_unrelated_places_are_distant() {
        let a = place("a", Category::Cafe, 47.37, 8.54, &["coffee"]);
        let b = place("b", Category::Viewpoint, 46.0, 7.0, &["view"]);
        assert!(experiential_distance(&a, &b) > 0.99);
    }

    #[rstest]
    #[case(&["coffee", "cozy"], &["coffee", "cozy"], Category::Cafe, true)]
    #[case(&["coffee", "cozy"], &["coffee"], Category::Cafe, false)]
    #[case(&["coffee", "cozy"], &["coffee", "cozy"], Category::Bar, false)]
    fn similarity_gate(
        #[case] left: &[&str],
        #[case] right: &[&str],
        #[case] category: Category,
        #[case] expected: bool,
    ) {
        let a = place("a", Category::Cafe, 47.37, 8.54, left);
        let b = place("b", category, 47.37, 8.54, right);
        assert_eq!(is_too_similar(&a, &b, 0.75), expected);
    }

    #[rstest]
    fn shared_area_is_too_similar() {
        let a = place("a", Category::Cafe, 47.37, 8.54, &[]).with_area("Seefeld");
        let b = place("b", Category::Museum, 47.37, 8.54, &["art"]).with_area("Seefeld");
        assert!(is_too_similar(&a, &b, 0.99));
    }

    #[rstest]
    fn untagged_place_is_too_similar_to_itself() {
        let a = place("a", Category::Park, 47.37, 8.54, &[]);
        assert!(is_too_similar(&a, &a, 1.0));
    }

    #[rstest]
    fn mmr_ties_go_to_first_candidate() {
        let picked = mmr_select(vec![("x", 1.0), ("y", 1.0)], 1, 0.7, |_: &&str, _: &&str| 0.0);
        assert_eq!(picked, vec!["x"]);
    }

    #[rstest]
    fn mmr_with_non_positive_scores_still_selects() {
        let picked = mmr_select(vec![(1, -2.0), (2, 0.0), (3, -1.0)], 3, 1.0, |_: &i32, _: &i32| 0.0);
        assert_eq!(picked, vec![2, 3, 1]);
    }
}
