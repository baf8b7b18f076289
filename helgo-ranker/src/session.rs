//! Per-conversation preference learning.
//!
//! Every category and tag carries a Beta(α, β) belief that starts at
//! Beta(1, 1). Positive interactions add to α, negative ones to β. Beliefs
//! never decay for the lifetime of the session.

#![expect(
    clippy::float_arithmetic,
    reason = "Beta posteriors are updated and blended with floating-point arithmetic"
)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use helgo_core::{Category, Place, PlaceId, Tag};

/// Weight of the category posterior in the session boost.
const CATEGORY_WEIGHT: f64 = 0.6;
/// Weight of the mean tag posterior in the session boost.
const TAG_WEIGHT: f64 = 0.4;

/// Identifies a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self("default".to_owned())
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Beta(α, β) belief about how much the user likes something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaPrior {
    /// Pseudo-count of positive outcomes.
    pub alpha: f64,
    /// Pseudo-count of negative outcomes.
    pub beta: f64,
}

impl Default for BetaPrior {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl BetaPrior {
    /// Construct a prior from explicit pseudo-counts.
    #[must_use]
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Posterior mean `α / (α + β)`, or `0.5` when both are zero.
    ///
    /// # Examples
    /// ```
    /// use helgo_ranker::BetaPrior;
    ///
    /// assert_eq!(BetaPrior::new(3.0, 1.0).mean(), 0.75);
    /// assert_eq!(BetaPrior::new(0.0, 0.0).mean(), 0.5);
    /// ```
    #[must_use]
    pub fn mean(self) -> f64 {
        let total = self.alpha + self.beta;
        if total <= 0.0 {
            return 0.5;
        }
        self.alpha / total
    }

    /// Number of interactions recorded on top of the uniform start.
    #[must_use]
    pub fn observations(self) -> f64 {
        (self.alpha + self.beta - 2.0).max(0.0)
    }

    fn reward(&mut self) {
        self.alpha += 1.0;
    }

    fn penalise(&mut self) {
        self.beta += 1.0;
    }
}

/// Learned preferences and exposure history for one conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    categories: HashMap<Category, BetaPrior>,
    tags: HashMap<Tag, BetaPrior>,
    shown: HashSet<PlaceId>,
    selected: Vec<PlaceId>,
    rejected: BTreeSet<Category>,
}

impl SessionState {
    /// Start an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The user picked or liked `place`.
    pub fn record_positive_interaction(&mut self, place: &Place) {
        self.selected.push(place.id.clone());
        self.categories.entry(place.category).or_default().reward();
        for tag in &place.tags {
            self.tags.entry(tag.clone()).or_default().reward();
        }
    }

    /// The user dismissed `place`.
    pub fn record_negative_interaction(&mut self, place: &Place) {
        self.categories.entry(place.category).or_default().penalise();
        self.rejected.insert(place.category);
        for tag in &place.tags {
            self.tags.entry(tag.clone()).or_default().penalise();
        }
    }

    /// Mark `places` as shown. Repeated calls are harmless.
    pub fn record_shown_places<'a, I>(&mut self, places: I)
    where
        I: IntoIterator<Item = &'a Place>,
    {
        self.shown
            .extend(places.into_iter().map(|place| place.id.clone()));
    }

    /// Report whether `id` has been shown.
    #[must_use]
    pub fn has_shown(&self, id: &PlaceId) -> bool {
        self.shown.contains(id)
    }

    /// Number of distinct places shown.
    #[must_use]
    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    /// Positively selected places, oldest first.
    #[must_use]
    pub fn selected(&self) -> &[PlaceId] {
        &self.selected
    }

    /// Categories the user has rejected at least once.
    #[must_use]
    pub const fn rejected_categories(&self) -> &BTreeSet<Category> {
        &self.rejected
    }

    /// Current belief for `category`.
    #[must_use]
    pub fn category_prior(&self, category: Category) -> BetaPrior {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    /// Current belief for `tag`.
    #[must_use]
    pub fn tag_prior(&self, tag: &str) -> BetaPrior {
        self.tags.get(tag).copied().unwrap_or_default()
    }

    /// Session boost on `0..=100`: 60 % category posterior mean plus 40 %
    /// the average tag posterior mean. Places without tags use `0.5` for the
    /// tag term.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "tag counts are small"
    )]
    pub fn session_boost(&self, place: &Place) -> f64 {
        let category = self.category_prior(place.category).mean();
        let tags = if place.tags.is_empty() {
            0.5
        } else {
            let total: f64 = place
                .tags
                .iter()
                .map(|tag| self.tag_prior(tag.as_str()).mean())
                .sum();
            total / place.tags.len() as f64
        };
        100.0 * (CATEGORY_WEIGHT * category + TAG_WEIGHT * tags)
    }
}
