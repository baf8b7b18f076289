//! Tokenisation and query expansion shared by lexical matching.
//!
//! The lexical index and the keyword-overlap score must agree on how text is
//! split, so both go through [`tokenize`].

use std::collections::HashSet;

use helgo_core::{Category, Place};

/// Common English words that carry no matching signal.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "are", "was", "were", "been", "being", "have",
    "has", "had", "does", "did", "will", "would", "could", "should", "may", "might", "can",
    "shall", "not", "but", "from", "into", "about", "out", "its", "you", "your", "our", "they",
    "them", "their", "his", "her", "some", "any", "very", "just", "also", "there", "here",
    "what", "where", "when", "which", "who", "how", "want", "like", "get", "let", "near", "today",
    "tonight", "now",
];

/// Dictionary synonyms added to query tokens.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("cozy", &["warm", "intimate", "snug", "comfortable"]),
    ("romantic", &["date", "intimate", "candlelit"]),
    ("quiet", &["calm", "peaceful", "tranquil"]),
    ("lively", &["busy", "buzzing", "vibrant"]),
    ("view", &["panorama", "vista", "scenic", "lookout"]),
    ("cheap", &["budget", "affordable", "inexpensive"]),
    ("coffee", &["cafe", "espresso", "latte"]),
    ("hike", &["trail", "walk", "nature"]),
    ("lake", &["water", "shore", "swim"]),
    ("historic", &["old", "heritage", "oldtown"]),
    ("art", &["gallery", "museum", "exhibition"]),
    ("cocktails", &["bar", "drinks", "mixology"]),
    ("green", &["park", "nature", "garden"]),
    ("photo", &["photogenic", "scenic", "view"]),
    ("hip", &["trendy", "modern", "cool"]),
    ("family", &["kids", "children"]),
    ("sunset", &["golden", "evening", "dusk"]),
    ("food", &["eat", "dining", "cuisine"]),
    ("rain", &["indoor", "sheltered", "dry"]),
];

/// Terms that describe each category.
const fn category_terms(category: Category) -> &'static [&'static str] {
    match category {
        Category::Cafe => &["coffee", "espresso", "pastry"],
        Category::Restaurant => &["dining", "food", "meal"],
        Category::Viewpoint => &["view", "panorama", "lookout", "scenic"],
        Category::Walk => &["stroll", "promenade", "path"],
        Category::Bar => &["drinks", "cocktails", "nightlife"],
        Category::Museum => &["art", "exhibition", "gallery", "history"],
        Category::Market => &["food", "stalls", "local"],
        Category::Park => &["green", "nature", "garden"],
        Category::Activity => &["fun", "experience"],
        Category::Shopping => &["shops", "boutique"],
        Category::Sport => &["active", "fitness"],
        Category::Wellness => &["spa", "relax", "sauna"],
        Category::Accommodation => &["hotel", "stay"],
        Category::Event => &["concert", "festival"],
        Category::Sightseeing => &["landmark", "attraction", "sights"],
    }
}

/// Lowercase `text`, split on non-alphanumeric characters and drop short
/// tokens and stop-words.
///
/// # Examples
/// ```
/// use helgo_ranker::tokenize;
///
/// assert_eq!(tokenize("A cozy Café, by the lake!"), vec!["cozy", "café", "lake"]);
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_owned)
        .collect()
}

/// Expand a query with synonyms and category terms.
///
/// The result lists the original tokens, then their synonyms, then the terms
/// of any category named by a token, without duplicates and in first-seen
/// order.
///
/// # Examples
/// ```
/// use helgo_ranker::expand_query;
///
/// let expanded = expand_query("quiet viewpoint");
/// assert_eq!(&expanded[..4], ["quiet", "viewpoint", "calm", "peaceful"]);
/// assert!(expanded.contains(&"panorama".to_owned()));
/// ```
#[must_use]
pub fn expand_query(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let synonyms = tokens.iter().flat_map(|token| {
        SYNONYMS
            .iter()
            .filter(move |(word, _)| *word == token.as_str())
            .flat_map(|(_, synonyms)| synonyms.iter().copied())
    });
    let category = tokens
        .iter()
        .filter_map(|token| token.parse::<Category>().ok())
        .flat_map(|category| category_terms(category).iter().copied());

    let mut seen = HashSet::new();
    let mut expanded = Vec::new();
    let ordered = tokens
        .iter()
        .map(String::as_str)
        .chain(synonyms)
        .chain(category);
    for term in ordered {
        if seen.insert(term.to_owned()) {
            expanded.push(term.to_owned());
        }
    }
    expanded
}

/// Text indexed for a place: name, description, tags and category.
#[must_use]
pub fn place_document(place: &Place) -> String {
    let tags: Vec<&str> = place.tags.iter().map(|tag| tag.as_str()).collect();
    format!(
        "{} {} {} {}",
        place.name,
        place.description.as_deref().unwrap_or_default(),
        tags.join(" "),
        place.category
    )
}

/// Fraction of `expanded` terms that appear verbatim in `document_lower`.
///
/// Returns `0.0` for an empty term list.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "overlap is a ratio of small term counts"
)]
pub fn keyword_overlap(expanded: &[String], document_lower: &str) -> f64 {
    if expanded.is_empty() {
        return 0.0;
    }
    let hits = expanded
        .iter()
        .filter(|term| document_lower.contains(term.as_str()))
        .count();
    hits as f64 / expanded.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;

    #[rstest]
    #[case("The best view in town", vec!["best", "view", "town"])]
    #[case("a an to", Vec::<&str>::new())]
    #[case("hip-hop & rock'n'roll", vec!["hip", "hop", "rock", "roll"])]
    fn tokenizes(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(tokenize(text), expected);
    }

    #[rstest]
    fn expansion_orders_tokens_synonyms_then_category_terms() {
        let expanded = expand_query("cozy cafe");
        assert_eq!(
            expanded,
            vec![
                "cozy",
                "cafe",
                "warm",
                "intimate",
                "snug",
                "comfortable",
                "coffee",
                "espresso",
                "pastry",
            ]
        );
    }

    #[rstest]
    fn expansion_deduplicates() {
        let expanded = expand_query("romantic cozy");
        let intimate = expanded.iter().filter(|term| *term == "intimate").count();
        assert_eq!(intimate, 1);
    }

    #[rstest]
    fn overlap_counts_verbatim_hits() {
        let expanded = vec!["lake".to_owned(), "view".to_owned(), "swim".to_owned(), "spa".to_owned()];
        let overlap = keyword_overlap(&expanded, "seebad utoquai lake swim wellness");
        assert!((overlap - 0.5).abs() < f64::EPSILON);
        assert!(keyword_overlap(&[], "anything").abs() < f64::EPSILON);
    }

    #[rstest]
    fn document_joins_fields() {
        let place = Place::new("p", "Lindenhof", Category::Viewpoint, Coord { x: 8.5, y: 47.4 })
            .expect("valid place")
            .with_description("Old town square")
            .with_tags(["view"]);
        assert_eq!(place_document(&place), "Lindenhof Old town square view viewpoint");
    }
}
