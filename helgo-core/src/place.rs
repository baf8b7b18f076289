//! Catalog places and the vocabulary used to describe them.
//!
//! Places are immutable once a catalog snapshot is loaded. The serialised
//! form matches the catalog JSON produced by the data build scripts
//! (`lat`/`lon`, `indoorOutdoor`, `durationMins`, `bestTimeOfDay`), and every
//! record is validated on the way in via [`Place::try_from`].

use std::{borrow::Borrow, collections::BTreeSet, fmt};

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::{haversine_km, valid_coordinate};

/// Stable identifier of a catalog place.
///
/// # Examples
/// ```
/// use helgo_core::PlaceId;
///
/// let id = PlaceId::from("osm-node-1-lindenhof");
/// assert_eq!(id.as_str(), "osm-node-1-lindenhof");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlaceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlaceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A free-form descriptive tag such as `cozy` or `italian`.
///
/// Tags are trimmed and lowercased on construction so comparisons never need
/// to normalise again.
///
/// # Examples
/// ```
/// use helgo_core::Tag;
///
/// let tag = Tag::new("  Cozy ")?;
/// assert_eq!(tag.as_str(), "cozy");
/// # Ok::<(), helgo_core::PlaceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Normalise and validate a tag.
    ///
    /// # Errors
    /// Returns [`PlaceError::BlankTag`] when the value is empty after
    /// trimming.
    pub fn new(value: impl AsRef<str>) -> Result<Self, PlaceError> {
        let normalised = value.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(PlaceError::BlankTag);
        }
        Ok(Self(normalised))
    }

    /// Borrow the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Tag {
    type Error = PlaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error raised when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// Name of the vocabulary being parsed, e.g. `category`.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Defines a closed, lowercase-serialised vocabulary with string helpers.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Return the variant as a lowercase `&str`.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::place::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == lowered)
                    .ok_or_else(|| $crate::place::UnknownVariant {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }
    };
}

pub(crate) use vocabulary;

vocabulary! {
    /// Broad kind of place.
    ///
    /// # Examples
    /// ```
    /// use helgo_core::Category;
    ///
    /// assert_eq!(Category::Viewpoint.as_str(), "viewpoint");
    /// assert_eq!("Museum".parse::<Category>()?, Category::Museum);
    /// # Ok::<(), helgo_core::UnknownVariant>(())
    /// ```
    Category, "category" {
        /// Coffee houses and tea rooms.
        Cafe => "cafe",
        /// Sit-down dining.
        Restaurant => "restaurant",
        /// Lookouts and panoramas.
        Viewpoint => "viewpoint",
        /// Walking routes and trails.
        Walk => "walk",
        /// Bars and pubs.
        Bar => "bar",
        /// Museums and galleries.
        Museum => "museum",
        /// Markets and market halls.
        Market => "market",
        /// Parks and gardens.
        Park => "park",
        /// General activities.
        Activity => "activity",
        /// Shops and boutiques.
        Shopping => "shopping",
        /// Sport venues.
        Sport => "sport",
        /// Spas and baths.
        Wellness => "wellness",
        /// Hotels and hostels.
        Accommodation => "accommodation",
        /// Time-bound events.
        Event => "event",
        /// Landmarks and attractions.
        Sightseeing => "sightseeing",
    }
}

vocabulary! {
    /// Whether a visit happens inside, outside, or both.
    Setting, "setting" {
        /// Fully sheltered.
        Indoor => "indoor",
        /// Fully exposed to the weather.
        Outdoor => "outdoor",
        /// Partly sheltered.
        Mixed => "mixed",
    }
}

impl Default for Setting {
    fn default() -> Self {
        Self::Mixed
    }
}

vocabulary! {
    /// Coarse price level.
    PriceTier, "price tier" {
        /// Cheap eats and free sights.
        Budget => "budget",
        /// Typical city prices.
        Moderate => "moderate",
        /// Special-occasion prices.
        Upscale => "upscale",
    }
}

vocabulary! {
    /// The part of the day a place is best enjoyed in.
    TimeOfDay, "time of day" {
        /// Before noon.
        Morning => "morning",
        /// Noon until late afternoon.
        Afternoon => "afternoon",
        /// Around sunset.
        Sunset => "sunset",
        /// After sunset.
        Evening => "evening",
        /// Late night.
        Night => "night",
        /// No particular preference.
        Any => "any",
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self::Any
    }
}

/// Months during which a seasonal place operates, inclusive on both ends.
///
/// Windows may wrap around the new year: `start_month = 11, end_month = 2`
/// covers November through February.
///
/// # Examples
/// ```
/// use helgo_core::SeasonalWindow;
///
/// let winter = SeasonalWindow::new(11, 2)?;
/// assert!(winter.contains(1));
/// assert!(!winter.contains(6));
/// # Ok::<(), helgo_core::PlaceError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalWindow {
    /// First active month (`1..=12`).
    pub start_month: u8,
    /// Last active month (`1..=12`).
    pub end_month: u8,
}

impl SeasonalWindow {
    /// Validate and construct a window.
    ///
    /// # Errors
    /// Returns [`PlaceError::InvalidMonth`] when either month is outside
    /// `1..=12`.
    pub fn new(start_month: u8, end_month: u8) -> Result<Self, PlaceError> {
        for month in [start_month, end_month] {
            if !(1..=12).contains(&month) {
                return Err(PlaceError::InvalidMonth { month });
            }
        }
        Ok(Self {
            start_month,
            end_month,
        })
    }

    /// Report whether `month` (`1..=12`) falls inside the window.
    #[must_use]
    pub const fn contains(self, month: u8) -> bool {
        if self.start_month <= self.end_month {
            month >= self.start_month && month <= self.end_month
        } else {
            month >= self.start_month || month <= self.end_month
        }
    }
}

/// Errors returned while constructing or decoding a [`Place`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaceError {
    /// The identifier was blank.
    #[error("place id must not be empty")]
    MissingId,
    /// The display name was blank.
    #[error("place {id} must have a name")]
    MissingName {
        /// Identifier of the offending place.
        id: String,
    },
    /// Latitude or longitude was out of range or not finite.
    #[error("place {id} has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates {
        /// Identifier of the offending place.
        id: String,
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },
    /// Popularity exceeded 100.
    #[error("popularity {value} exceeds 100")]
    InvalidPopularity {
        /// Rejected value.
        value: u8,
    },
    /// A seasonal month was outside `1..=12`.
    #[error("month {month} is outside 1..=12")]
    InvalidMonth {
        /// Rejected month.
        month: u8,
    },
    /// A tag was empty after trimming.
    #[error("tags must not be blank")]
    BlankTag,
}

/// A place from the catalog.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use helgo_core::{Category, Place};
///
/// let place = Place::new("p1", "Lindenhof", Category::Viewpoint, Coord { x: 8.541, y: 47.373 })?
///     .with_tags(["view", "oldtown"]);
/// assert!(place.has_tag("view"));
/// # Ok::<(), helgo_core::PlaceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlaceRecord", into = "PlaceRecord")]
pub struct Place {
    /// Unique identifier.
    pub id: PlaceId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Broad kind of place.
    pub category: Category,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Descriptive tags.
    pub tags: BTreeSet<Tag>,
    /// Indoor/outdoor setting.
    pub setting: Setting,
    /// Typical visit length in minutes.
    pub duration_mins: u16,
    /// Optional price level.
    pub price_tier: Option<PriceTier>,
    /// Best part of the day to visit.
    pub best_time: TimeOfDay,
    /// Optional popularity in `0..=100`.
    pub popularity: Option<u8>,
    /// Optional months of operation.
    pub seasonal: Option<SeasonalWindow>,
    /// Optional precomputed text embedding.
    pub embedding: Option<Vec<f32>>,
    /// Optional named neighbourhood.
    pub area: Option<String>,
    /// Optional postal code.
    pub postal_code: Option<String>,
    /// Named photo spots at the place.
    pub photo_spots: Vec<String>,
    /// Whether the place is currently marked closed.
    pub closed: bool,
    /// Optional elevation in metres.
    pub elevation_m: Option<f64>,
    /// Optional street address.
    pub address: Option<String>,
    /// Optional website.
    pub website: Option<String>,
}

const DEFAULT_DURATION_MINS: u16 = 60;

impl Place {
    /// Validate and construct a place with default attributes.
    ///
    /// # Errors
    /// Returns [`PlaceError`] when the id or name is blank or the coordinates
    /// are outside WGS84 bounds.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        location: Coord<f64>,
    ) -> Result<Self, PlaceError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(PlaceError::MissingId);
        }
        if name.trim().is_empty() {
            return Err(PlaceError::MissingName { id });
        }
        if !valid_coordinate(location) {
            return Err(PlaceError::InvalidCoordinates {
                id,
                lat: location.y,
                lon: location.x,
            });
        }
        Ok(Self {
            id: PlaceId(id),
            name,
            description: None,
            category,
            location,
            tags: BTreeSet::new(),
            setting: Setting::default(),
            duration_mins: DEFAULT_DURATION_MINS,
            price_tier: None,
            best_time: TimeOfDay::default(),
            popularity: None,
            seasonal: None,
            embedding: None,
            area: None,
            postal_code: None,
            photo_spots: Vec::new(),
            closed: false,
            elevation_m: None,
            address: None,
            website: None,
        })
    }

    /// Add tags while returning `self` for chaining. Blank entries are
    /// ignored.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags
            .extend(tags.into_iter().filter_map(|tag| Tag::new(tag).ok()));
        self
    }

    /// Set the indoor/outdoor setting.
    #[must_use]
    pub const fn with_setting(mut self, setting: Setting) -> Self {
        self.setting = setting;
        self
    }

    /// Set the typical visit length.
    #[must_use]
    pub const fn with_duration(mut self, minutes: u16) -> Self {
        self.duration_mins = minutes;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the named neighbourhood.
    #[must_use]
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    /// Set the postal code.
    #[must_use]
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Set the precomputed embedding.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Return whether the place carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Return whether the place carries any of `tags`.
    #[must_use]
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.has_tag(tag))
    }

    /// Count the tags shared with `other`.
    #[must_use]
    pub fn shared_tag_count(&self, other: &Self) -> usize {
        self.tags.intersection(&other.tags).count()
    }

    /// Straight-line distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(self.location, other.location)
    }

    /// Report whether the place operates in `month` (`1..=12`).
    #[must_use]
    pub fn is_in_season(&self, month: u8) -> bool {
        self.seasonal.is_none_or(|window| window.contains(month))
    }
}

/// Wire representation of a [`Place`] in catalog JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceRecord {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    category: Category,
    lat: f64,
    lon: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, rename = "indoorOutdoor")]
    setting: Setting,
    #[serde(default = "default_duration")]
    duration_mins: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price_tier: Option<PriceTier>,
    #[serde(default)]
    best_time_of_day: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    popularity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seasonal: Option<SeasonalWindow>,
    #[serde(default, skip_serializing)]
    embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    photo_spots: Vec<String>,
    #[serde(default)]
    closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    website: Option<String>,
}

const fn default_duration() -> u16 {
    DEFAULT_DURATION_MINS
}

impl TryFrom<PlaceRecord> for Place {
    type Error = PlaceError;

    fn try_from(record: PlaceRecord) -> Result<Self, Self::Error> {
        if let Some(value) = record.popularity.filter(|value| *value > 100) {
            return Err(PlaceError::InvalidPopularity { value });
        }
        let seasonal = record
            .seasonal
            .map(|window| SeasonalWindow::new(window.start_month, window.end_month))
            .transpose()?;
        let mut place = Self::new(
            record.id,
            record.name,
            record.category,
            Coord {
                x: record.lon,
                y: record.lat,
            },
        )?
        .with_tags(record.tags);
        place.description = record.description;
        place.setting = record.setting;
        place.duration_mins = record.duration_mins;
        place.price_tier = record.price_tier;
        place.best_time = record.best_time_of_day;
        place.popularity = record.popularity;
        place.seasonal = seasonal;
        place.embedding = record.embedding;
        place.area = record.area;
        place.postal_code = record.postal_code;
        place.photo_spots = record.photo_spots;
        place.closed = record.closed;
        place.elevation_m = record.elevation_m;
        place.address = record.address;
        place.website = record.website;
        Ok(place)
    }
}

impl From<Place> for PlaceRecord {
    fn from(place: Place) -> Self {
        Self {
            id: place.id.0,
            name: place.name,
            description: place.description,
            category: place.category,
            lat: place.location.y,
            lon: place.location.x,
            tags: place.tags.into_iter().map(String::from).collect(),
            setting: place.setting,
            duration_mins: place.duration_mins,
            price_tier: place.price_tier,
            best_time_of_day: place.best_time,
            popularity: place.popularity,
            seasonal: place.seasonal,
            embedding: place.embedding,
            area: place.area,
            postal_code: place.postal_code,
            photo_spots: place.photo_spots,
            closed: place.closed,
            elevation_m: place.elevation_m,
            address: place.address,
            website: place.website,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn origin() -> Coord<f64> {
        Coord { x: 8.54, y: 47.37 }
    }

    #[rstest]
    fn tags_are_normalised() {
        let place = Place::new("p", "Cafe", Category::Cafe, origin())
            .expect("valid place")
            .with_tags(["Cozy", " COFFEE ", ""]);
        let tags: Vec<_> = place.tags.iter().map(Tag::as_str).collect();
        assert_eq!(tags, vec!["coffee", "cozy"]);
    }

    #[rstest]
    #[case("", "Name")]
    #[case("id", "  ")]
    fn blank_identity_is_rejected(#[case] id: &str, #[case] name: &str) {
        assert!(Place::new(id, name, Category::Park, origin()).is_err());
    }

    #[rstest]
    #[case(Coord { x: 181.0, y: 0.0 })]
    #[case(Coord { x: 0.0, y: -91.0 })]
    #[case(Coord { x: f64::NAN, y: 0.0 })]
    fn out_of_range_coordinates_are_rejected(#[case] location: Coord<f64>) {
        let err = Place::new("p", "Somewhere", Category::Park, location)
            .expect_err("coordinates should be rejected");
        assert!(matches!(err, PlaceError::InvalidCoordinates { .. }));
    }

    #[rstest]
    #[case(3, 5, 4, true)]
    #[case(3, 5, 6, false)]
    #[case(11, 2, 12, true)]
    #[case(11, 2, 1, true)]
    #[case(11, 2, 2, true)]
    #[case(11, 2, 7, false)]
    fn seasonal_window_wraps_around_new_year(
        #[case] start: u8,
        #[case] end: u8,
        #[case] month: u8,
        #[case] expected: bool,
    ) {
        let window = SeasonalWindow::new(start, end).expect("valid window");
        assert_eq!(window.contains(month), expected);
    }

    #[rstest]
    fn seasonal_window_rejects_month_thirteen() {
        assert_eq!(
            SeasonalWindow::new(1, 13),
            Err(PlaceError::InvalidMonth { month: 13 })
        );
    }

    #[rstest]
    fn category_parsing_rejects_unknown() {
        let err = "spaceport".parse::<Category>().expect_err("unknown category");
        assert_eq!(err.kind, "category");
        assert!(err.to_string().contains("spaceport"));
    }

    #[rstest]
    fn decodes_catalog_record() {
        let json = r#"{
            "id": "osm-node-1-cafe-odeon",
            "name": "Café Odeon",
            "category": "cafe",
            "lat": 47.3667,
            "lon": 8.5453,
            "tags": ["coffee", "historic"],
            "indoorOutdoor": "indoor",
            "durationMins": 45,
            "bestTimeOfDay": "morning",
            "popularity": 88,
            "seasonal": { "startMonth": 11, "endMonth": 2 },
            "embedding": [0.1, 0.2]
        }"#;
        let place: Place = serde_json::from_str(json).expect("decode place");
        assert_eq!(place.category, Category::Cafe);
        assert_eq!(place.setting, Setting::Indoor);
        assert_eq!(place.best_time, TimeOfDay::Morning);
        assert_eq!(place.duration_mins, 45);
        assert!(place.has_tag("historic"));
        assert!(!place.is_in_season(7));
        assert_eq!(place.embedding.as_deref(), Some(&[0.1_f32, 0.2_f32][..]));
    }

    #[rstest]
    fn decoding_rejects_excess_popularity() {
        let json = r#"{"id":"p","name":"P","category":"bar","lat":0.0,"lon":0.0,"popularity":140}"#;
        let err = serde_json::from_str::<Place>(json).expect_err("popularity above 100");
        assert!(err.to_string().contains("popularity"));
    }

    #[rstest]
    fn serialisation_omits_embedding() {
        let place = Place::new("p", "P", Category::Park, origin())
            .expect("valid place")
            .with_embedding(vec![1.0, 0.0]);
        let json = serde_json::to_value(&place).expect("encode place");
        assert!(json.get("embedding").is_none());
        assert_eq!(json.get("lat").and_then(serde_json::Value::as_f64), Some(47.37));
    }
}
