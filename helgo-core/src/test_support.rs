//! Test-only fixtures shared by unit, behaviour and benchmark code.
//!
//! The sample catalog is a small slice of central Zurich with a mix of
//! categories, postal codes, embeddings and seasonal windows.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use time::OffsetDateTime;

use crate::{
    CatalogError, CatalogSnapshot, CatalogSource, Category, EmbeddingError, Place, PriceTier,
    QueryEmbedder, SeasonalWindow, Setting, SourceTier, TimeOfDay,
};

/// Build a place at `(lat, lon)` carrying `tags`.
///
/// # Panics
/// Panics when the id is blank or the coordinates are invalid.
#[expect(clippy::expect_used, reason = "fixtures should fail fast during setup")]
#[must_use]
pub fn place(id: &str, category: Category, lat: f64, lon: f64, tags: &[&str]) -> Place {
    Place::new(id, id.replace('-', " "), category, Coord { x: lon, y: lat })
        .expect("fixture place should be valid")
        .with_tags(tags.iter().copied())
}

struct Spec<'a> {
    id: &'a str,
    name: &'a str,
    category: Category,
    lat: f64,
    lon: f64,
    tags: &'a [&'a str],
    setting: Setting,
    postal: &'a str,
    area: Option<&'a str>,
    popularity: Option<u8>,
    embedding: Option<[f32; 3]>,
}

impl Spec<'_> {
    #[expect(clippy::expect_used, reason = "fixtures should fail fast during setup")]
    fn build(&self) -> Place {
        let mut built = Place::new(
            self.id,
            self.name,
            self.category,
            Coord {
                x: self.lon,
                y: self.lat,
            },
        )
        .expect("fixture place should be valid")
        .with_tags(self.tags.iter().copied())
        .with_setting(self.setting)
        .with_postal_code(self.postal);
        built.area = self.area.map(str::to_owned);
        built.popularity = self.popularity;
        built.embedding = self.embedding.map(Vec::from);
        built
    }
}

/// A small catalog of central Zurich places.
#[must_use]
#[expect(
    clippy::too_many_lines,
    reason = "the fixture catalog is a flat table of places"
)]
pub fn zurich_catalog() -> Vec<Place> {
    let specs = [
        Spec {
            id: "cafe-odeon",
            name: "Café Odeon",
            category: Category::Cafe,
            lat: 47.3667,
            lon: 8.5453,
            tags: &["coffee", "historic", "cozy"],
            setting: Setting::Indoor,
            postal: "8001",
            area: Some("Altstadt"),
            popularity: Some(80),
            embedding: Some([1.0, 0.1, 0.0]),
        },
        Spec {
            id: "lindenhof",
            name: "Lindenhof",
            category: Category::Viewpoint,
            lat: 47.3730,
            lon: 8.5410,
            tags: &["view", "oldtown", "photo", "quiet"],
            setting: Setting::Outdoor,
            postal: "8001",
            area: Some("Altstadt"),
            popularity: Some(85),
            embedding: Some([0.0, 1.0, 0.1]),
        },
        Spec {
            id: "osteria-della-nonna",
            name: "Osteria della Nonna",
            category: Category::Restaurant,
            lat: 47.3700,
            lon: 8.5440,
            tags: &["italian", "cozy", "romantic"],
            setting: Setting::Indoor,
            postal: "8001",
            area: Some("Altstadt"),
            popularity: Some(70),
            embedding: Some([0.2, 0.0, 1.0]),
        },
        Spec {
            id: "trattoria-limmat",
            name: "Trattoria Limmat",
            category: Category::Restaurant,
            lat: 47.3760,
            lon: 8.5400,
            tags: &["italian", "lively"],
            setting: Setting::Indoor,
            postal: "8001",
            area: None,
            popularity: Some(60),
            embedding: Some([0.1, 0.0, 0.9]),
        },
        Spec {
            id: "sushi-kaze",
            name: "Sushi Kaze",
            category: Category::Restaurant,
            lat: 47.3780,
            lon: 8.5320,
            tags: &["sushi", "asian", "hip"],
            setting: Setting::Indoor,
            postal: "8004",
            area: Some("Aussersihl"),
            popularity: Some(65),
            embedding: None,
        },
        Spec {
            id: "taqueria-sol",
            name: "Taqueria Sol",
            category: Category::Restaurant,
            lat: 47.3790,
            lon: 8.5280,
            tags: &["mexican", "cheap", "hip"],
            setting: Setting::Mixed,
            postal: "8004",
            area: Some("Aussersihl"),
            popularity: Some(55),
            embedding: None,
        },
        Spec {
            id: "kunsthaus",
            name: "Kunsthaus",
            category: Category::Museum,
            lat: 47.3702,
            lon: 8.5482,
            tags: &["art", "historic", "quiet"],
            setting: Setting::Indoor,
            postal: "8001",
            area: None,
            popularity: Some(90),
            embedding: Some([0.3, 0.3, 0.0]),
        },
        Spec {
            id: "seebad-utoquai",
            name: "Seebad Utoquai",
            category: Category::Wellness,
            lat: 47.3600,
            lon: 8.5480,
            tags: &["lake", "swim"],
            setting: Setting::Outdoor,
            postal: "8008",
            area: Some("Seefeld"),
            popularity: Some(50),
            embedding: None,
        },
        Spec {
            id: "zurichhorn",
            name: "Zürichhorn Park",
            category: Category::Park,
            lat: 47.3550,
            lon: 8.5530,
            tags: &["lake", "green", "family", "quiet"],
            setting: Setting::Outdoor,
            postal: "8008",
            area: Some("Seefeld"),
            popularity: Some(75),
            embedding: Some([0.0, 0.7, 0.0]),
        },
        Spec {
            id: "uetliberg",
            name: "Uetliberg",
            category: Category::Viewpoint,
            lat: 47.3497,
            lon: 8.4911,
            tags: &["view", "panorama", "hike", "photo"],
            setting: Setting::Outdoor,
            postal: "8143",
            area: None,
            popularity: Some(88),
            embedding: Some([0.0, 1.0, 0.0]),
        },
        Spec {
            id: "limmat-promenade",
            name: "Limmat Promenade",
            category: Category::Walk,
            lat: 47.3740,
            lon: 8.5430,
            tags: &["bridge", "oldtown", "photo", "street"],
            setting: Setting::Outdoor,
            postal: "8001",
            area: None,
            popularity: Some(70),
            embedding: None,
        },
        Spec {
            id: "kronenhalle-bar",
            name: "Kronenhalle Bar",
            category: Category::Bar,
            lat: 47.3675,
            lon: 8.5465,
            tags: &["cocktails", "historic", "romantic"],
            setting: Setting::Indoor,
            postal: "8001",
            area: None,
            popularity: Some(82),
            embedding: Some([0.4, 0.0, 0.6]),
        },
        Spec {
            id: "markthalle",
            name: "Markthalle im Viadukt",
            category: Category::Market,
            lat: 47.3880,
            lon: 8.5250,
            tags: &["food", "local", "cheap"],
            setting: Setting::Mixed,
            postal: "8005",
            area: Some("Kreis 5"),
            popularity: Some(72),
            embedding: None,
        },
        Spec {
            id: "viadukt-shops",
            name: "Im Viadukt",
            category: Category::Shopping,
            lat: 47.3885,
            lon: 8.5270,
            tags: &["local", "hip"],
            setting: Setting::Mixed,
            postal: "8005",
            area: None,
            popularity: Some(60),
            embedding: None,
        },
    ];
    let mut places: Vec<Place> = specs.iter().map(Spec::build).collect();
    for place in &mut places {
        match place.id.as_str() {
            "cafe-odeon" => {
                place.best_time = TimeOfDay::Morning;
                place.duration_mins = 45;
                place.price_tier = Some(PriceTier::Moderate);
            }
            "lindenhof" => {
                place.best_time = TimeOfDay::Sunset;
                place.duration_mins = 30;
                place.photo_spots = vec!["terrace wall".to_owned()];
            }
            "osteria-della-nonna" | "trattoria-limmat" | "sushi-kaze" => {
                place.best_time = TimeOfDay::Evening;
                place.duration_mins = 90;
            }
            "taqueria-sol" => place.price_tier = Some(PriceTier::Budget),
            "kronenhalle-bar" => {
                place.best_time = TimeOfDay::Night;
                place.price_tier = Some(PriceTier::Upscale);
            }
            "seebad-utoquai" => {
                place.seasonal = SeasonalWindow::new(6, 9).ok();
            }
            "uetliberg" => {
                place.elevation_m = Some(870.0);
                place.duration_mins = 180;
                place.description = Some("Zurich's house mountain with a panorama over the lake".to_owned());
            }
            _ => {}
        }
    }
    places
}

/// Catalog source that always fails with [`CatalogError::Unavailable`].
#[derive(Debug, Clone, Copy)]
pub struct FailingCatalog(pub SourceTier);

impl CatalogSource for FailingCatalog {
    fn tier(&self) -> SourceTier {
        self.0
    }

    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        Err(CatalogError::Unavailable {
            tier: self.0,
            reason: "simulated outage".to_owned(),
        })
    }
}

/// Embedder returning a fixed vector for every query.
#[derive(Debug, Clone, Default)]
pub struct FixedEmbedder(pub Vec<f32>);

impl FixedEmbedder {
    /// Wrap the embedder for [`crate::EmbeddingClient`].
    #[must_use]
    pub fn shared(vector: Vec<f32>) -> Arc<dyn QueryEmbedder> {
        Arc::new(Self(vector))
    }
}

#[async_trait]
impl QueryEmbedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.0.clone())
    }
}

/// Embedder that answers only after `delay`.
#[derive(Debug, Clone)]
pub struct StalledEmbedder {
    /// Time before the answer.
    pub delay: Duration,
    /// The eventual answer.
    pub vector: Vec<f32>,
}

#[async_trait]
impl QueryEmbedder for StalledEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.vector.clone())
    }
}

/// A fixed freshness timestamp for snapshots.
#[must_use]
pub const fn fixed_freshness() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}
