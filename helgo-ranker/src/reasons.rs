//! Human-readable explanations for anchors and satellites.

use helgo_core::{Category, Intent, Place, RecommendationContext, Setting, haversine_km};

/// Anchors closer than this count as "around the corner".
const NEARBY_KM: f64 = 0.5;
/// Popularity from which a place counts as a favourite.
const FAVOURITE_POPULARITY: u8 = 80;

/// Explain why `place` was picked as an anchor.
///
/// The first matching rule wins: requested cuisine, requested vibe, shelter
/// from rain, golden-hour views, proximity, popularity.
#[must_use]
pub fn anchor_reason(place: &Place, intent: &Intent, context: &RecommendationContext) -> String {
    if let Some(cuisine) = intent
        .cuisines
        .iter()
        .find(|cuisine| place.has_tag(cuisine.as_str()))
    {
        return format!("serves the {cuisine} food you asked for");
    }
    if let Some(vibe) = intent.vibes.iter().find(|vibe| place.has_tag(vibe.as_str())) {
        return format!("has the {vibe} feel you wanted");
    }
    if context.is_raining() && place.setting == Setting::Indoor {
        return "keeps you dry while it rains".to_owned();
    }
    if context.daylight.is_golden_hour && place.has_any_tag(&["view", "photo", "panorama", "sunset"])
    {
        return "catches the golden-hour light".to_owned();
    }
    if context
        .user_location
        .is_some_and(|user| haversine_km(user, place.location) <= NEARBY_KM)
    {
        return "just around the corner".to_owned();
    }
    if place
        .popularity
        .is_some_and(|popularity| popularity >= FAVOURITE_POPULARITY)
    {
        return "a local favourite".to_owned();
    }
    "a good fit for right now".to_owned()
}

/// Reason used when anchors are ranked by distance alone.
///
/// # Examples
/// ```
/// use helgo_ranker::distance_reason;
///
/// assert_eq!(distance_reason(1.234), "1.2 km away");
/// ```
#[must_use]
pub fn distance_reason(distance_km: f64) -> String {
    format!("{distance_km:.1} km away")
}

/// Explain why `satellite` pairs well with its anchor.
#[must_use]
pub fn satellite_reason(satellite: &Place, context: &RecommendationContext) -> String {
    let reason = if satellite.has_any_tag(&["photo", "view"]) {
        "for extra photo angles"
    } else if satellite.category == Category::Walk {
        "for a short stroll"
    } else if satellite.setting == Setting::Indoor && context.is_raining() {
        "to stay warm and dry"
    } else {
        "a quick stop just nearby"
    };
    reason.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use helgo_core::test_support::place;
    use helgo_core::{Cuisine, Vibe, Weather};
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    #[fixture]
    fn noon() -> RecommendationContext {
        RecommendationContext::at(datetime!(2025-07-15 12:00 UTC))
    }

    #[fixture]
    fn rainy_noon(noon: RecommendationContext) -> RecommendationContext {
        noon.with_weather(Weather {
            precipitation_mm: 2.0,
            ..Weather::default()
        })
    }

    #[rstest]
    fn cuisine_beats_vibe(noon: RecommendationContext) {
        let osteria = place("o", Category::Restaurant, 47.37, 8.54, &["italian", "cozy"]);
        let intent = Intent {
            cuisines: vec![Cuisine::Italian],
            vibes: vec![Vibe::Cozy],
            ..Intent::default()
        };
        assert_eq!(
            anchor_reason(&osteria, &intent, &noon),
            "serves the italian food you asked for"
        );
    }

    #[rstest]
    fn rain_reason_for_indoor_places(rainy_noon: RecommendationContext) {
        let museum =
            place("m", Category::Museum, 47.37, 8.54, &[]).with_setting(Setting::Indoor);
        assert_eq!(
            anchor_reason(&museum, &Intent::default(), &rainy_noon),
            "keeps you dry while it rains"
        );
    }

    #[rstest]
    fn proximity_then_popularity(noon: RecommendationContext) {
        let mut square = place("s", Category::Sightseeing, 47.37, 8.54, &[]);
        square.popularity = Some(90);
        let intent = Intent::default();
        assert_eq!(anchor_reason(&square, &intent, &noon), "a local favourite");
        let here = noon.with_user_location(square.location);
        assert_eq!(anchor_reason(&square, &intent, &here), "just around the corner");
    }

    #[rstest]
    #[case(Category::Viewpoint, &["view"], Setting::Outdoor, "for extra photo angles")]
    #[case(Category::Walk, &[], Setting::Outdoor, "for a short stroll")]
    #[case(Category::Cafe, &[], Setting::Indoor, "to stay warm and dry")]
    #[case(Category::Cafe, &[], Setting::Mixed, "a quick stop just nearby")]
    fn satellite_reason_precedence(
        rainy_noon: RecommendationContext,
        #[case] category: Category,
        #[case] tags: &[&str],
        #[case] setting: Setting,
        #[case] expected: &str,
    ) {
        let satellite = place("s", category, 47.37, 8.54, tags).with_setting(setting);
        assert_eq!(satellite_reason(&satellite, &rainy_noon), expected);
    }
}
