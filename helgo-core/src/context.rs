//! Situational context supplied with every request.

use geo::Coord;
use time::OffsetDateTime;

/// Precipitation above this many millimetres counts as rain.
pub const RAIN_THRESHOLD_MM: f64 = 0.1;

/// Weather snapshot for "now".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    /// Cloud cover in percent.
    pub cloud_cover_pct: f64,
    /// Air temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Wind speed in km/h.
    pub wind_kmh: f64,
    /// Precipitation in millimetres over the last hour.
    pub precipitation_mm: f64,
    /// Relative humidity in percent.
    pub humidity_pct: f64,
}

impl Weather {
    /// Report whether it is currently raining.
    #[must_use]
    pub fn is_raining(&self) -> bool {
        self.precipitation_mm > RAIN_THRESHOLD_MM
    }
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            cloud_cover_pct: 20.0,
            temperature_c: 18.0,
            wind_kmh: 5.0,
            precipitation_mm: 0.0,
            humidity_pct: 60.0,
        }
    }
}

/// Daylight snapshot for "now".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Daylight {
    /// Solar altitude above the horizon in degrees.
    pub solar_altitude_deg: f64,
    /// Whether the sun is up.
    pub is_day: bool,
    /// Whether it is evening.
    pub is_evening: bool,
    /// Whether the light is golden.
    pub is_golden_hour: bool,
    /// Today's sunrise, when known.
    pub sunrise: Option<OffsetDateTime>,
    /// Today's sunset, when known.
    pub sunset: Option<OffsetDateTime>,
}

impl Daylight {
    /// Rough daylight estimate from the local hour alone.
    ///
    /// Used when no solar-position provider is available: day runs from
    /// 07:00 to 19:59, evening from 18:00 to 04:59 and golden hour covers
    /// 07:00 and 18:00 to 19:59.
    #[must_use]
    pub fn approximate(hour: u8) -> Self {
        let is_day = (7..20).contains(&hour);
        let solar_altitude_deg = match hour {
            11..=14 => 55.0,
            9 | 10 | 15 | 16 => 35.0,
            7 | 8 | 17 => 15.0,
            18 | 19 => 4.0,
            _ => -20.0,
        };
        Self {
            solar_altitude_deg,
            is_day,
            is_evening: hour >= 18 || hour < 5,
            is_golden_hour: hour == 7 || (18..20).contains(&hour),
            sunrise: None,
            sunset: None,
        }
    }
}

/// Everything the ranker needs to know about the user's situation.
///
/// # Examples
/// ```
/// use helgo_core::RecommendationContext;
/// use time::macros::datetime;
///
/// let ctx = RecommendationContext::at(datetime!(2025-06-01 19:00 +02:00));
/// assert!(ctx.daylight.is_evening);
/// assert_eq!(ctx.month(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationContext {
    /// Current local time.
    pub now: OffsetDateTime,
    /// Current weather.
    pub weather: Weather,
    /// Current daylight.
    pub daylight: Daylight,
    /// The user's position, when permission was granted.
    pub user_location: Option<Coord<f64>>,
}

impl RecommendationContext {
    /// Construct a context from its parts.
    #[must_use]
    pub const fn new(now: OffsetDateTime, weather: Weather, daylight: Daylight) -> Self {
        Self {
            now,
            weather,
            daylight,
            user_location: None,
        }
    }

    /// Context at `now` with mild dry weather and daylight estimated from the
    /// hour.
    #[must_use]
    pub fn at(now: OffsetDateTime) -> Self {
        Self::new(now, Weather::default(), Daylight::approximate(now.hour()))
    }

    /// Attach the user's position.
    #[must_use]
    pub const fn with_user_location(mut self, location: Coord<f64>) -> Self {
        self.user_location = Some(location);
        self
    }

    /// Replace the weather snapshot.
    #[must_use]
    pub const fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    /// Local hour of day (`0..=23`).
    #[must_use]
    pub const fn local_hour(&self) -> u8 {
        self.now.hour()
    }

    /// Current month (`1..=12`).
    #[must_use]
    pub fn month(&self) -> u8 {
        u8::from(self.now.month())
    }

    /// Report whether it is raining.
    #[must_use]
    pub fn is_raining(&self) -> bool {
        self.weather.is_raining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    #[rstest]
    #[case(0.0, false)]
    #[case(0.1, false)]
    #[case(0.4, true)]
    fn rain_threshold(#[case] precipitation_mm: f64, #[case] expected: bool) {
        let weather = Weather {
            precipitation_mm,
            ..Weather::default()
        };
        assert_eq!(weather.is_raining(), expected);
    }

    #[rstest]
    #[case(3, false, true, false)]
    #[case(7, true, false, true)]
    #[case(12, true, false, false)]
    #[case(19, true, true, true)]
    #[case(22, false, true, false)]
    fn approximates_daylight_from_hour(
        #[case] hour: u8,
        #[case] is_day: bool,
        #[case] is_evening: bool,
        #[case] golden: bool,
    ) {
        let daylight = Daylight::approximate(hour);
        assert_eq!(daylight.is_day, is_day);
        assert_eq!(daylight.is_evening, is_evening);
        assert_eq!(daylight.is_golden_hour, golden);
    }

    #[rstest]
    fn exposes_hour_and_month() {
        let ctx = RecommendationContext::at(datetime!(2025-11-03 08:30 +01:00));
        assert_eq!(ctx.local_hour(), 8);
        assert_eq!(ctx.month(), 11);
        assert!(ctx.user_location.is_none());
    }
}
