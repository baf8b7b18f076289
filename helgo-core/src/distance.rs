//! Straight-line distance helpers.
//!
//! Only great-circle distance is needed for proximity scoring, so the
//! haversine formula on a spherical Earth is sufficient.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance between two WGS84 coordinates in kilometres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use helgo_core::haversine_km;
///
/// let zurich = Coord { x: 8.5417, y: 47.3769 };
/// assert!(haversine_km(zurich, zurich).abs() < 1e-9);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "haversine requires trigonometric arithmetic on coordinates"
)]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Report whether a coordinate lies within WGS84 bounds.
#[must_use]
pub fn valid_coordinate(coord: Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

/// Serialised `{ "lat": .., "lon": .. }` form of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct LatLon {
    lat: f64,
    lon: f64,
}

impl From<LatLon> for Coord<f64> {
    fn from(value: LatLon) -> Self {
        Self {
            x: value.lon,
            y: value.lat,
        }
    }
}

impl From<Coord<f64>> for LatLon {
    fn from(value: Coord<f64>) -> Self {
        Self {
            lat: value.y,
            lon: value.x,
        }
    }
}

/// Serde adapter storing an optional [`Coord`] as `{ "lat", "lon" }`.
pub(crate) mod optional_lat_lon {
    use geo::Coord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::LatLon;

    pub(crate) fn serialize<S>(value: &Option<Coord<f64>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(LatLon::from).serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Coord<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<LatLon>::deserialize(deserializer)?.map(Coord::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn zurich_to_bern_is_about_95_km() {
        let zurich = Coord { x: 8.5417, y: 47.3769 };
        let bern = Coord { x: 7.4474, y: 46.9480 };
        let km = haversine_km(zurich, bern);
        assert!((km - 95.5).abs() < 1.5, "unexpected distance {km}");
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = Coord { x: 8.54, y: 47.37 };
        let b = Coord { x: 8.55, y: 47.36 };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-12);
    }

    #[rstest]
    #[case(Coord { x: 0.0, y: 0.0 }, true)]
    #[case(Coord { x: 180.0, y: 90.0 }, true)]
    #[case(Coord { x: 180.1, y: 0.0 }, false)]
    #[case(Coord { x: 0.0, y: f64::INFINITY }, false)]
    fn validates_bounds(#[case] coord: Coord<f64>, #[case] expected: bool) {
        assert_eq!(valid_coordinate(coord), expected);
    }
}
