//! Precomputed place embeddings for cosine matching against a query vector.

#![expect(
    clippy::float_arithmetic,
    reason = "embedding normalisation and dot products are floating-point"
)]

use std::collections::HashMap;

use helgo_core::{Place, PlaceId};

/// L2-normalised place vectors of one fixed dimension.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    dimension: Option<usize>,
    vectors: HashMap<PlaceId, Vec<f32>>,
}

/// Normalise `vector` to unit length, or return `None` for a zero or
/// non-finite vector.
#[must_use]
pub fn normalize(vector: &[f32]) -> Option<Vec<f32>> {
    let norm = vector
        .iter()
        .map(|component| f64::from(*component) * f64::from(*component))
        .sum::<f64>()
        .sqrt();
    if !norm.is_finite() || norm <= 0.0 {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "unit-length components fit in f32"
    )]
    let normalised = vector
        .iter()
        .map(|component| (f64::from(*component) / norm) as f32)
        .collect();
    Some(normalised)
}

impl EmbeddingIndex {
    /// Build the index. The first non-empty embedding fixes the dimension;
    /// places with a missing, mismatched or degenerate embedding are left
    /// out.
    #[must_use]
    pub fn build(places: &[Place]) -> Self {
        let dimension = places
            .iter()
            .filter_map(|place| place.embedding.as_ref())
            .map(Vec::len)
            .find(|len| *len > 0);
        let Some(expected) = dimension else {
            return Self::default();
        };
        let mut vectors = HashMap::new();
        for place in places {
            let Some(embedding) = place.embedding.as_deref() else {
                continue;
            };
            if embedding.len() != expected {
                log::warn!(
                    "excluding embedding for {}: dimension {} != {expected}",
                    place.id,
                    embedding.len()
                );
                continue;
            }
            match normalize(embedding) {
                Some(vector) => {
                    vectors.insert(place.id.clone(), vector);
                }
                None => log::warn!("excluding degenerate embedding for {}", place.id),
            }
        }
        log::debug!(
            "built embedding index: {} vectors of dimension {expected}",
            vectors.len()
        );
        Self {
            dimension: Some(expected),
            vectors,
        }
    }

    /// Fixed vector dimension, if any place carried an embedding.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Report whether no vectors are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Report whether `id` has a stored vector.
    #[must_use]
    pub fn contains(&self, id: &PlaceId) -> bool {
        self.vectors.contains_key(id)
    }

    /// Prepare a query vector: normalised, and only when its dimension
    /// matches the index.
    #[must_use]
    pub fn prepare_query(&self, query: &[f32]) -> Option<Vec<f32>> {
        if self.dimension != Some(query.len()) {
            log::warn!(
                "ignoring query embedding of dimension {} (index has {:?})",
                query.len(),
                self.dimension
            );
            return None;
        }
        normalize(query)
    }

    /// Cosine score on `0..=100` for a prepared query. Places without a
    /// stored vector score zero.
    #[must_use]
    pub fn score(&self, id: &PlaceId, prepared_query: &[f32]) -> f64 {
        self.vectors.get(id).map_or(0.0, |vector| {
            let dot: f64 = vector
                .iter()
                .zip(prepared_query)
                .map(|(a, b)| f64::from(*a) * f64::from(*b))
                .sum();
            dot.clamp(0.0, 1.0) * 100.0
        })
    }
}
