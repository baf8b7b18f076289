//! Distance-decay curves for proximity scoring.
//!
//! The adaptive path always uses [`exponential_decay`]; the other shapes are
//! available for callers that want a different falloff.

#![expect(
    clippy::float_arithmetic,
    reason = "decay curves are continuous functions of distance"
)]

use helgo_core::{RecommendationContext, WalkingPreference};

/// Peak score and length scale of the exponential proximity bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayParameters {
    /// Score at zero distance.
    pub max_score: f64,
    /// Length scale λ in kilometres.
    pub lambda_km: f64,
}

impl Default for DecayParameters {
    fn default() -> Self {
        Self {
            max_score: 25.0,
            lambda_km: 1.5,
        }
    }
}

impl DecayParameters {
    /// Adapt the default curve to the situation.
    ///
    /// Evenings narrow λ by 0.7 and cap the peak at 20; rain narrows λ by
    /// 0.6 and lifts the peak to 30; a short walking preference narrows λ by
    /// 0.8 and a long one widens it by 1.5.
    ///
    /// # Examples
    /// ```
    /// use helgo_core::{RecommendationContext, Weather};
    /// use helgo_ranker::DecayParameters;
    /// use time::macros::datetime;
    ///
    /// let rainy_noon = RecommendationContext::at(datetime!(2025-04-02 12:00 UTC)).with_weather(Weather {
    ///     precipitation_mm: 2.0,
    ///     ..Weather::default()
    /// });
    /// let params = DecayParameters::adaptive(&rainy_noon, None);
    /// assert_eq!(params.max_score, 30.0);
    /// assert!((params.lambda_km - 0.9).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn adaptive(context: &RecommendationContext, walking: Option<WalkingPreference>) -> Self {
        let mut params = Self::default();
        if context.daylight.is_evening {
            params.lambda_km *= 0.7;
            params.max_score = params.max_score.min(20.0);
        }
        if context.is_raining() {
            params.lambda_km *= 0.6;
            params.max_score = 30.0;
        }
        match walking {
            Some(WalkingPreference::Short) => params.lambda_km *= 0.8,
            Some(WalkingPreference::Long) => params.lambda_km *= 1.5,
            None => {}
        }
        params
    }

    /// Evaluate the exponential curve at `distance_km`.
    #[must_use]
    pub fn score(self, distance_km: f64) -> f64 {
        exponential_decay(distance_km, self.max_score, self.lambda_km)
    }
}

/// `max_score · exp(−distance / λ)`. A non-positive λ keeps the peak only at
/// zero distance.
///
/// # Examples
/// ```
/// use helgo_ranker::exponential_decay;
///
/// assert_eq!(exponential_decay(0.0, 25.0, 1.5), 25.0);
/// assert!(exponential_decay(1.0, 25.0, 1.5) < 25.0);
/// ```
#[must_use]
pub fn exponential_decay(distance_km: f64, max_score: f64, lambda_km: f64) -> f64 {
    if lambda_km <= 0.0 || !lambda_km.is_finite() {
        return if distance_km <= 0.0 { max_score } else { 0.0 };
    }
    max_score * (-distance_km.max(0.0) / lambda_km).exp()
}

/// `max_score · exp(−distance² / 2σ²)`.
#[must_use]
pub fn gaussian_decay(distance_km: f64, max_score: f64, sigma_km: f64) -> f64 {
    if sigma_km <= 0.0 || !sigma_km.is_finite() {
        return if distance_km <= 0.0 { max_score } else { 0.0 };
    }
    max_score * (-(distance_km * distance_km) / (2.0 * sigma_km * sigma_km)).exp()
}

/// `max_score / (1 + ln(1 + distance / scale))`; falls off quickly then
/// flattens.
#[must_use]
pub fn logarithmic_decay(distance_km: f64, max_score: f64, scale_km: f64) -> f64 {
    if scale_km <= 0.0 || !scale_km.is_finite() {
        return if distance_km <= 0.0 { max_score } else { 0.0 };
    }
    max_score / (1.0 + (distance_km.max(0.0) / scale_km).ln_1p())
}

/// `max_score / (1 + exp(steepness · (distance − midpoint)))`; near-flat
/// until `midpoint`, then drops.
#[must_use]
pub fn sigmoid_decay(distance_km: f64, max_score: f64, midpoint_km: f64, steepness: f64) -> f64 {
    max_score / (1.0 + (steepness * (distance_km - midpoint_km)).exp())
}
