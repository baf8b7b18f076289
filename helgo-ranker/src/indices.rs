//! Immutable bundle of every index built from one catalog snapshot.

use std::collections::HashMap;

use helgo_core::{Place, PlaceId};
use time::OffsetDateTime;

use crate::embedding_index::EmbeddingIndex;
use crate::spatial::SpatialIndex;
use crate::tfidf::TfIdfIndex;

/// Places plus their lexical, vector and spatial indices.
///
/// An `IndexSet` is never mutated after construction; rebuilding produces a
/// fresh set that replaces the old one wholesale.
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    places: Vec<Place>,
    slots: HashMap<PlaceId, usize>,
    tfidf: TfIdfIndex,
    embeddings: EmbeddingIndex,
    spatial: SpatialIndex,
    freshness: Option<OffsetDateTime>,
}

impl IndexSet {
    /// Index `places` as of `freshness`.
    #[must_use]
    pub fn build(places: Vec<Place>, freshness: OffsetDateTime) -> Self {
        let tfidf = TfIdfIndex::build(&places);
        let embeddings = EmbeddingIndex::build(&places);
        let spatial = SpatialIndex::build(&places);
        let slots = places
            .iter()
            .enumerate()
            .map(|(slot, place)| (place.id.clone(), slot))
            .collect();
        log::debug!(
            "indexed {} places ({} terms, {} embeddings)",
            places.len(),
            tfidf.vocabulary_len(),
            embeddings.len()
        );
        Self {
            places,
            slots,
            tfidf,
            embeddings,
            spatial,
            freshness: Some(freshness),
        }
    }

    /// Catalog places in load order.
    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Place at `slot`.
    #[must_use]
    pub fn place(&self, slot: usize) -> Option<&Place> {
        self.places.get(slot)
    }

    /// Slot of the place with `id`.
    #[must_use]
    pub fn slot_of(&self, id: &PlaceId) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Lexical index.
    #[must_use]
    pub const fn tfidf(&self) -> &TfIdfIndex {
        &self.tfidf
    }

    /// Embedding index.
    #[must_use]
    pub const fn embeddings(&self) -> &EmbeddingIndex {
        &self.embeddings
    }

    /// Spatial index.
    #[must_use]
    pub const fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Snapshot timestamp, or `None` before the first build.
    #[must_use]
    pub const fn freshness(&self) -> Option<OffsetDateTime> {
        self.freshness
    }

    /// Number of indexed places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Report whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Report whether a snapshot at `freshness` should replace this one.
    #[must_use]
    pub fn is_stale(&self, freshness: OffsetDateTime) -> bool {
        self.freshness.is_none_or(|built| freshness > built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helgo_core::test_support::{fixed_freshness, zurich_catalog};
    use rstest::rstest;
    use time::Duration;

    #[rstest]
    fn empty_set_is_always_stale() {
        assert!(IndexSet::default().is_stale(fixed_freshness()));
    }

    #[rstest]
    fn only_newer_snapshots_are_stale() {
        let set = IndexSet::build(zurich_catalog(), fixed_freshness());
        assert!(!set.is_stale(fixed_freshness()));
        assert!(set.is_stale(fixed_freshness() + Duration::minutes(5)));
        assert_eq!(set.slot_of(&PlaceId::from("kunsthaus")), Some(6));
        assert_eq!(set.len(), set.spatial().len());
    }
}
