//! TF-IDF vector space over place text.
//!
//! Each place document is tokenised with [`tokenize`], weighted with smoothed
//! IDF `ln((N + 1) / (df + 1)) + 1` and stored as an L2-normalised sparse
//! vector. Similarity is the dot product of two normalised vectors.

#![expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "TF-IDF weighting is floating-point arithmetic over term counts"
)]

use std::collections::{BTreeMap, HashMap, HashSet};

use helgo_core::{Place, PlaceId};

use crate::text::{expand_query, keyword_overlap, place_document, tokenize};

/// Norms below this are treated as this value when normalising.
const NORM_FLOOR: f64 = 1e-12;

/// Weight of cosine similarity in the lexical semantic score.
const COSINE_WEIGHT: f64 = 60.0;
/// Weight of expanded-keyword overlap in the lexical semantic score.
const OVERLAP_WEIGHT: f64 = 40.0;

/// A sparse vector of `(column, weight)` pairs sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(weights: BTreeMap<usize, f64>) -> Self {
        let norm = weights
            .values()
            .map(|weight| weight * weight)
            .sum::<f64>()
            .sqrt()
            .max(NORM_FLOOR);
        Self {
            entries: weights
                .into_iter()
                .map(|(column, weight)| (column, weight / norm))
                .collect(),
        }
    }

    /// Non-zero entries in column order.
    #[must_use]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Report whether every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, weight)| *weight == 0.0)
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, weight)| weight * weight)
            .sum::<f64>()
            .sqrt()
    }

    /// Dot product via a merge over both sorted entry lists.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        let mut left = self.entries.iter().peekable();
        let mut right = other.entries.iter().peekable();
        let mut total = 0.0;
        while let (Some(&&(a_col, a_weight)), Some(&&(b_col, b_weight))) = (left.peek(), right.peek()) {
            match a_col.cmp(&b_col) {
                std::cmp::Ordering::Less => {
                    left.next();
                }
                std::cmp::Ordering::Greater => {
                    right.next();
                }
                std::cmp::Ordering::Equal => {
                    total += a_weight * b_weight;
                    left.next();
                    right.next();
                }
            }
        }
        total
    }
}

/// Cosine similarity of two normalised vectors, clamped to `[0, 1]`.
#[must_use]
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    a.dot(b).clamp(0.0, 1.0)
}

/// A query prepared once per request for lexical scoring.
#[derive(Debug, Clone, Default)]
pub struct LexicalQuery {
    vector: SparseVector,
    expanded: Vec<String>,
}

impl LexicalQuery {
    /// Report whether the query carries no terms at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// The expanded query terms.
    #[must_use]
    pub fn expanded_terms(&self) -> &[String] {
        &self.expanded
    }
}

/// Lexical index over a catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    vectors: HashMap<PlaceId, SparseVector>,
    documents: HashMap<PlaceId, String>,
}

impl TfIdfIndex {
    /// Build the index from `places`.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use helgo_core::{Category, Place};
    /// use helgo_ranker::TfIdfIndex;
    ///
    /// let place = Place::new("p", "Lakeside bench", Category::Park, Coord { x: 8.5, y: 47.4 })?;
    /// let index = TfIdfIndex::build(&[place]);
    /// assert_eq!(index.len(), 1);
    /// assert!(index.vocabulary_len() >= 2);
    /// # Ok::<(), helgo_core::PlaceError>(())
    /// ```
    #[must_use]
    pub fn build(places: &[Place]) -> Self {
        let tokenised: Vec<(&Place, Vec<String>)> = places
            .iter()
            .map(|place| (place, tokenize(&place_document(place))))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();
        for (_, tokens) in &tokenised {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            let mut ordered: Vec<&str> = unique.into_iter().collect();
            ordered.sort_unstable();
            for term in ordered {
                let column = *vocabulary.entry(term.to_owned()).or_insert_with(|| {
                    document_frequency.push(0);
                    document_frequency.len() - 1
                });
                if let Some(df) = document_frequency.get_mut(column) {
                    *df += 1;
                }
            }
        }

        let total = places.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|df| ((total + 1.0) / (*df as f64 + 1.0)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            vectors: HashMap::with_capacity(places.len()),
            documents: HashMap::with_capacity(places.len()),
        };
        for (place, tokens) in tokenised {
            let vector = index.weigh(&tokens);
            index.vectors.insert(place.id.clone(), vector);
            index
                .documents
                .insert(place.id.clone(), place_document(place).to_lowercase());
        }
        log::debug!(
            "built lexical index: {} places, {} terms",
            index.vectors.len(),
            index.vocabulary.len()
        );
        index
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        if tokens.is_empty() {
            return SparseVector::default();
        }
        let count = tokens.len() as f64;
        let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&column) = self.vocabulary.get(token) {
                *weights.entry(column).or_insert(0.0) += 1.0;
            }
        }
        for (column, weight) in &mut weights {
            let idf = self.idf.get(*column).copied().unwrap_or(1.0);
            *weight = *weight / count * idf;
        }
        SparseVector::from_weights(weights)
    }

    /// Vectorise free text against the index vocabulary. Terms the catalog
    /// never uses are dropped.
    #[must_use]
    pub fn vectorize(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    /// Prepare `text` for repeated scoring.
    #[must_use]
    pub fn prepare_query(&self, text: &str) -> LexicalQuery {
        LexicalQuery {
            vector: self.vectorize(text),
            expanded: expand_query(text),
        }
    }

    /// Stored vector for `id`.
    #[must_use]
    pub fn vector(&self, id: &PlaceId) -> Option<&SparseVector> {
        self.vectors.get(id)
    }

    /// Cosine similarity between the stored vector for `id` and `query`.
    /// Unknown places score zero.
    #[must_use]
    pub fn similarity(&self, id: &PlaceId, query: &SparseVector) -> f64 {
        self.vectors
            .get(id)
            .map_or(0.0, |vector| cosine_similarity(vector, query))
    }

    /// Lexical semantic score on `0..=100`: 60 × cosine plus 40 × keyword
    /// overlap of the expanded query with the place document.
    #[must_use]
    pub fn semantic_score(&self, place: &Place, query: &LexicalQuery) -> f64 {
        if query.is_empty() {
            return 0.0;
        }
        let cosine = self.similarity(&place.id, &query.vector);
        let overlap = self.documents.get(&place.id).map_or_else(
            || keyword_overlap(&query.expanded, &place_document(place).to_lowercase()),
            |document| keyword_overlap(&query.expanded, document),
        );
        COSINE_WEIGHT * cosine + OVERLAP_WEIGHT * overlap
    }

    /// Number of indexed places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Report whether no places are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vocabulary size.
    #[must_use]
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Smoothed IDF for `term`, if it is in the vocabulary.
    #[must_use]
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary
            .get(term)
            .and_then(|column| self.idf.get(*column))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helgo_core::Category;
    use helgo_core::test_support::{place, zurich_catalog};
    use rstest::{fixture, rstest};

    #[fixture]
    fn index() -> TfIdfIndex {
        TfIdfIndex::build(&zurich_catalog())
    }

    #[rstest]
    fn idf_is_smoothed(index: TfIdfIndex) {
        // "italian" appears in 2 of 14 documents.
        let expected = (15.0_f64 / 3.0).ln() + 1.0;
        let idf = index.idf("italian").expect("term indexed");
        assert!((idf - expected).abs() < 1e-12);
        assert!(index.idf("the").is_none());
    }

    #[rstest]
    fn stored_vectors_are_unit_length(index: TfIdfIndex) {
        for place in zurich_catalog() {
            let vector = index.vector(&place.id).expect("every place indexed");
            assert!((vector.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[rstest]
    fn unknown_terms_vectorise_to_zero() {
        let mut bare = place("x", Category::Park, 47.0, 8.0, &[]);
        bare.name = "Xy".into();
        let index = TfIdfIndex::build(&[bare.clone()]);
        let vector = index.vector(&bare.id).expect("indexed");
        // Only "park" survives the length filter.
        assert_eq!(vector.entries().len(), 1);
        assert!(index.vectorize("").is_zero());
        assert!(index.vectorize("zzz qqq").is_zero());
    }

    #[rstest]
    fn lake_query_prefers_lake_places(index: TfIdfIndex) {
        let query = index.prepare_query("lake swim");
        let catalog = zurich_catalog();
        let score = |id: &str| {
            let found = catalog
                .iter()
                .find(|candidate| candidate.id.as_str() == id)
                .expect("fixture place");
            index.semantic_score(found, &query)
        };
        assert!(score("seebad-utoquai") > score("kunsthaus"));
        assert!(score("seebad-utoquai") <= 100.0);
    }

    #[rstest]
    fn empty_query_scores_zero(index: TfIdfIndex) {
        let query = index.prepare_query("   ");
        let catalog = zurich_catalog();
        let first = catalog.first().expect("fixture catalog");
        assert!(index.semantic_score(first, &query).abs() < f64::EPSILON);
    }
}
