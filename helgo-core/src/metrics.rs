//! Situational metrics attached to itineraries.
//!
//! Metrics are produced by an [`ExperienceMetrics`] collaborator. The
//! [`HeuristicMetrics`] implementation derives them from tags, weather,
//! daylight and elevation alone.

use serde::{Deserialize, Serialize};

use crate::{Daylight, Place, Weather};

/// Five labelled 0–100 sub-scores plus a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryMetrics {
    /// Quality of the light for the visit.
    pub light: u8,
    /// How calm the place is likely to be.
    pub calm: u8,
    /// Weather comfort for the setting.
    pub comfort: u8,
    /// Chance of a good view.
    pub view: u8,
    /// Strength of the atmosphere.
    pub atmosphere: u8,
    /// Composite memorability score.
    pub memorability: u8,
}

impl ItineraryMetrics {
    /// Build metrics from the five sub-scores, clamping each to `0..=100` and
    /// deriving memorability as their mean rounded up.
    ///
    /// # Examples
    /// ```
    /// use helgo_core::ItineraryMetrics;
    ///
    /// let metrics = ItineraryMetrics::from_scores(80, 60, 70, 90, 50);
    /// assert_eq!(metrics.memorability, 70);
    /// ```
    #[must_use]
    pub fn from_scores(light: u8, calm: u8, comfort: u8, view: u8, atmosphere: u8) -> Self {
        let parts = [light, calm, comfort, view, atmosphere].map(|score| score.min(100));
        let total: u16 = parts.iter().copied().map(u16::from).sum();
        let memorability = u8::try_from(total.div_ceil(5)).unwrap_or(100).min(100);
        let [light, calm, comfort, view, atmosphere] = parts;
        Self {
            light,
            calm,
            comfort,
            view,
            atmosphere,
            memorability,
        }
    }
}

/// Derives [`ItineraryMetrics`] for a place in the current conditions.
pub trait ExperienceMetrics: Send + Sync {
    /// Evaluate `place` under `weather` and `daylight`.
    fn evaluate(
        &self,
        place: &Place,
        weather: &Weather,
        daylight: &Daylight,
        elevation_m: Option<f64>,
    ) -> ItineraryMetrics;
}

/// Rule-of-thumb metrics computed without external data.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicMetrics;

impl HeuristicMetrics {
    const fn light(daylight: &Daylight) -> u8 {
        if daylight.is_golden_hour {
            95
        } else if daylight.is_day {
            70
        } else {
            35
        }
    }

    fn calm(place: &Place) -> u8 {
        if place.has_any_tag(&["quiet", "hidden", "local"]) {
            return 85;
        }
        match place.popularity {
            Some(popularity) => 100_u8.saturating_sub(popularity.div_ceil(2)),
            None => 60,
        }
    }

    fn comfort(place: &Place, weather: &Weather) -> u8 {
        use crate::Setting;

        let sheltered = place.setting == Setting::Indoor;
        if weather.is_raining() {
            return match place.setting {
                Setting::Indoor => 90,
                Setting::Mixed => 60,
                Setting::Outdoor => 20,
            };
        }
        let mild = (12.0..=26.0).contains(&weather.temperature_c);
        let calm_air = weather.wind_kmh < 25.0;
        match (sheltered, mild, calm_air) {
            (true, _, _) => 75,
            (false, true, true) => 90,
            (false, true, false) | (false, false, true) => 55,
            (false, false, false) => 30,
        }
    }

    fn view(place: &Place, elevation_m: Option<f64>) -> u8 {
        let tagged = place.has_any_tag(&["view", "panorama", "scenic", "lake"]);
        let high = elevation_m.is_some_and(|metres| metres >= 500.0);
        match (tagged, high) {
            (true, true) => 95,
            (true, false) | (false, true) => 75,
            (false, false) => 40,
        }
    }

    fn atmosphere(place: &Place, weather: &Weather) -> u8 {
        let mut score: u8 = 50;
        if place.has_any_tag(&["cozy", "romantic", "historic", "oldtown", "hip"]) {
            score = score.saturating_add(25);
        }
        if place.photo_spots.is_empty() {
            score
        } else if weather.cloud_cover_pct < 50.0 {
            score.saturating_add(20)
        } else {
            score.saturating_add(10)
        }
    }
}

impl ExperienceMetrics for HeuristicMetrics {
    fn evaluate(
        &self,
        place: &Place,
        weather: &Weather,
        daylight: &Daylight,
        elevation_m: Option<f64>,
    ) -> ItineraryMetrics {
        ItineraryMetrics::from_scores(
            Self::light(daylight),
            Self::calm(place),
            Self::comfort(place, weather),
            Self::view(place, elevation_m),
            Self::atmosphere(place, weather),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;

    use crate::{Category, Setting};

    fn place(setting: Setting, tags: &[&str]) -> Place {
        Place::new("p", "P", Category::Viewpoint, Coord { x: 8.5, y: 47.4 })
            .expect("valid place")
            .with_setting(setting)
            .with_tags(tags.iter().copied())
    }

    #[rstest]
    fn scores_are_clamped() {
        let metrics = ItineraryMetrics::from_scores(250, 100, 100, 100, 100);
        assert_eq!(metrics.light, 100);
        assert_eq!(metrics.memorability, 100);
    }

    #[rstest]
    fn rain_favours_indoor_comfort() {
        let rain = Weather {
            precipitation_mm: 3.0,
            ..Weather::default()
        };
        let daylight = Daylight::approximate(12);
        let indoor = HeuristicMetrics.evaluate(&place(Setting::Indoor, &[]), &rain, &daylight, None);
        let outdoor = HeuristicMetrics.evaluate(&place(Setting::Outdoor, &[]), &rain, &daylight, None);
        assert!(indoor.comfort > outdoor.comfort);
    }

    #[rstest]
    fn golden_hour_view_is_memorable() {
        let spot = place(Setting::Outdoor, &["view"]);
        let golden = HeuristicMetrics.evaluate(&spot, &Weather::default(), &Daylight::approximate(19), Some(870.0));
        let night = HeuristicMetrics.evaluate(&spot, &Weather::default(), &Daylight::approximate(23), None);
        assert_eq!(golden.view, 95);
        assert!(golden.memorability > night.memorability);
    }
}
