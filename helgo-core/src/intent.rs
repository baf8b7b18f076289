//! Parsed user requests.
//!
//! An [`Intent`] is produced once per user turn by an upstream parser and is
//! read-only to the ranker. The JSON form uses `snake_case` keys and every
//! field is optional, so `{}` is the empty (greeting) intent.

use std::fmt;
use std::str::FromStr;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::{optional_lat_lon, valid_coordinate};
use crate::place::{Category, Place, UnknownVariant, vocabulary};

vocabulary! {
    /// Cuisines a user can ask for. Matching is by tag of the same name.
    Cuisine, "cuisine" {
        /// Italian.
        Italian => "italian",
        /// Mexican.
        Mexican => "mexican",
        /// Sushi.
        Sushi => "sushi",
        /// Burgers.
        Burger => "burger",
        /// Pan-Asian.
        Asian => "asian",
        /// Swiss.
        Swiss => "swiss",
        /// Thai.
        Thai => "thai",
        /// Indian.
        Indian => "indian",
        /// Chinese.
        Chinese => "chinese",
        /// Turkish.
        Turkish => "turkish",
        /// French.
        French => "french",
        /// Pizza.
        Pizza => "pizza",
        /// Vegan.
        Vegan => "vegan",
        /// Coffee; also admits cafes to the cuisine filter.
        Coffee => "coffee",
    }
}

vocabulary! {
    /// Atmosphere tags a user can ask for.
    Vibe, "vibe" {
        /// Warm and intimate.
        Cozy => "cozy",
        /// Date-night.
        Romantic => "romantic",
        /// Trendy.
        Hip => "hip",
        /// Calm.
        Quiet => "quiet",
        /// Busy and loud.
        Lively => "lively",
        /// Good views.
        Scenic => "scenic",
        /// Old town and heritage.
        Historic => "historic",
        /// Where locals go.
        Local => "local",
        /// Relaxed.
        Chill => "chill",
    }
}

vocabulary! {
    /// Hard-ish requirements attached to a request.
    Constraint, "constraint" {
        /// Prefer cheap places.
        Budget => "budget",
        /// Avoid noisy places.
        Quiet => "quiet",
        /// It is raining or the user wants shelter.
        Rain => "rain",
        /// Suitable for children.
        FamilyFriendly => "family_friendly",
        /// Step-free access.
        Accessible => "accessible",
    }
}

vocabulary! {
    /// How much the user cares about photo opportunities.
    PhotoMode, "photo mode" {
        /// No photo preference.
        None => "none",
        /// Nice to have.
        Casual => "casual",
        /// The main purpose of the outing.
        Focused => "focused",
    }
}

impl Default for PhotoMode {
    fn default() -> Self {
        Self::None
    }
}

vocabulary! {
    /// Whether the user wants to be inside or outside.
    IndoorPreference, "indoor preference" {
        /// Sheltered places.
        Indoor => "indoor",
        /// Open-air places.
        Outdoor => "outdoor",
        /// Partly sheltered places.
        Mixed => "mixed",
        /// No preference expressed.
        NoPreference => "no_preference",
    }
}

impl Default for IndoorPreference {
    fn default() -> Self {
        Self::NoPreference
    }
}

vocabulary! {
    /// How far the user is willing to walk.
    WalkingPreference, "walking preference" {
        /// Keep it close.
        Short => "short",
        /// Happy to wander.
        Long => "long",
    }
}

/// Who the outing is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupContext {
    /// Number of people, including the user.
    pub size: u8,
    /// Whether children are coming along.
    #[serde(default)]
    pub with_children: bool,
}

/// Restricts candidates to a named area.
///
/// Postal codes take precedence; the centre and radius are used when no
/// postal code matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaFilter {
    /// Display name used in no-match messages.
    pub name: String,
    /// Postal codes belonging to the area.
    #[serde(default)]
    pub postal_codes: Vec<String>,
    /// Optional centre point.
    #[serde(default, with = "optional_lat_lon", skip_serializing_if = "Option::is_none")]
    pub center: Option<Coord<f64>>,
    /// Radius around `center` in kilometres.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

const fn default_radius_km() -> f64 {
    1.0
}

impl AreaFilter {
    /// Construct a radius filter around `center`.
    ///
    /// # Errors
    /// Returns [`IntentError`] when the name is blank, the centre is outside
    /// WGS84 bounds or the radius is not a positive finite number.
    pub fn around(
        name: impl Into<String>,
        center: Coord<f64>,
        radius_km: f64,
    ) -> Result<Self, IntentError> {
        Self {
            name: name.into(),
            postal_codes: Vec::new(),
            center: Some(center),
            radius_km,
        }
        .validate()
    }

    /// Validate the filter and return it.
    ///
    /// # Errors
    /// See [`AreaFilter::around`]. A filter with neither postal codes nor a
    /// centre is rejected with [`IntentError::EmptyArea`].
    pub fn validate(self) -> Result<Self, IntentError> {
        if self.name.trim().is_empty() {
            return Err(IntentError::BlankAreaName);
        }
        if self.postal_codes.is_empty() && self.center.is_none() {
            return Err(IntentError::EmptyArea { area: self.name });
        }
        if self.center.is_some_and(|center| !valid_coordinate(center)) {
            return Err(IntentError::InvalidAreaCenter { area: self.name });
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(IntentError::InvalidRadius {
                radius_km: self.radius_km,
            });
        }
        Ok(self)
    }

    /// Report whether `place` carries one of the area's postal codes.
    #[must_use]
    pub fn matches_postal_code(&self, place: &Place) -> bool {
        place.postal_code.as_deref().is_some_and(|code| {
            self.postal_codes
                .iter()
                .any(|candidate| candidate.trim().eq_ignore_ascii_case(code.trim()))
        })
    }
}

/// Errors raised when validating an [`Intent`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntentError {
    /// The time budget was zero minutes.
    #[error("time budget must be at least one minute")]
    ZeroTimeBudget,
    /// The group size was zero.
    #[error("group size must be at least one")]
    EmptyGroup,
    /// The area filter had no name.
    #[error("area filter must have a name")]
    BlankAreaName,
    /// The area filter had neither postal codes nor a centre.
    #[error("area '{area}' needs postal codes or a centre point")]
    EmptyArea {
        /// Name of the area.
        area: String,
    },
    /// The area centre was outside WGS84 bounds.
    #[error("area '{area}' has an invalid centre point")]
    InvalidAreaCenter {
        /// Name of the area.
        area: String,
    },
    /// The area radius was not positive and finite.
    #[error("area radius must be positive, got {radius_km}")]
    InvalidRadius {
        /// Rejected radius.
        radius_km: f64,
    },
    /// A vocabulary term was not recognised.
    #[error(transparent)]
    UnknownTerm(#[from] UnknownVariant),
}

/// A parsed user request.
///
/// # Examples
/// ```
/// use helgo_core::{Cuisine, Intent, Vibe};
///
/// let intent: Intent = serde_json::from_str(
///     r#"{"cuisines": ["italian"], "vibes": ["cozy"], "raw_text": "cozy italian"}"#,
/// )?;
/// assert_eq!(intent.cuisines, vec![Cuisine::Italian]);
/// assert_eq!(intent.vibes, vec![Vibe::Cozy]);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intent {
    /// Requested cuisines.
    pub cuisines: Vec<Cuisine>,
    /// Requested categories.
    pub categories: Vec<Category>,
    /// Requested atmosphere.
    pub vibes: Vec<Vibe>,
    /// Requirements.
    pub constraints: Vec<Constraint>,
    /// Available time in minutes.
    pub time_budget_mins: Option<u16>,
    /// Who is going.
    pub group: Option<GroupContext>,
    /// Photo emphasis.
    pub photo_mode: PhotoMode,
    /// Indoor/outdoor preference.
    pub indoor_preference: IndoorPreference,
    /// Optional area restriction.
    pub area: Option<AreaFilter>,
    /// Optional walking preference.
    pub walking: Option<WalkingPreference>,
    /// The request text as typed.
    pub raw_text: String,
}

impl Intent {
    /// Validate the intent and return it.
    ///
    /// # Errors
    /// Returns [`IntentError`] when the time budget or group size is zero or
    /// the area filter is invalid.
    pub fn validate(mut self) -> Result<Self, IntentError> {
        if self.time_budget_mins == Some(0) {
            return Err(IntentError::ZeroTimeBudget);
        }
        if self.group.as_ref().is_some_and(|group| group.size == 0) {
            return Err(IntentError::EmptyGroup);
        }
        self.area = self.area.map(AreaFilter::validate).transpose()?;
        Ok(self)
    }

    /// Report whether `category` was requested.
    #[must_use]
    pub fn wants_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Report whether `constraint` was requested.
    #[must_use]
    pub fn has_constraint(&self, constraint: Constraint) -> bool {
        self.constraints.contains(&constraint)
    }

    /// Report whether coffee is among the requested cuisines.
    #[must_use]
    pub fn wants_coffee(&self) -> bool {
        self.cuisines.contains(&Cuisine::Coffee)
    }

    /// Report whether the request carries no vibes, constraints, time
    /// budget, group, photo mode or indoor preference. Cuisines do not count
    /// against it.
    #[must_use]
    pub fn has_only_place_signal(&self) -> bool {
        self.vibes.is_empty()
            && self.constraints.is_empty()
            && self.time_budget_mins.is_none()
            && self.group.is_none()
            && self.photo_mode == PhotoMode::None
            && self.indoor_preference == IndoorPreference::NoPreference
    }

    /// Report whether this is a strict category/location request: it names a
    /// category or an area and nothing else.
    #[must_use]
    pub fn is_strict_category_or_location(&self) -> bool {
        (!self.categories.is_empty() || self.area.is_some()) && self.has_only_place_signal()
    }
}

/// Parse a comma-separated list of vocabulary terms.
///
/// # Errors
/// Returns [`IntentError::UnknownTerm`] for the first unrecognised entry.
///
/// # Examples
/// ```
/// use helgo_core::{Cuisine, parse_terms};
///
/// let cuisines: Vec<Cuisine> = parse_terms("italian, sushi")?;
/// assert_eq!(cuisines, vec![Cuisine::Italian, Cuisine::Sushi]);
/// # Ok::<(), helgo_core::IntentError>(())
/// ```
pub fn parse_terms<T>(list: &str) -> Result<Vec<T>, IntentError>
where
    T: FromStr<Err = UnknownVariant>,
{
    list.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| term.parse::<T>().map_err(IntentError::from))
        .collect()
}

impl fmt::Display for GroupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.with_children {
            write!(f, "group of {} with children", self.size)
        } else {
            write!(f, "group of {}", self.size)
        }
    }
}
