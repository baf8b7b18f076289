//! Scoring weights and engine tuning.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Non-normalised weights for the five scoring signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    /// Intent match.
    pub base: f64,
    /// Lexical or embedding similarity to the request text.
    pub semantic: f64,
    /// Weather, time of day, distance and popularity.
    pub context: f64,
    /// Thompson-sampled exploration.
    pub exploration: f64,
    /// Learned session preference.
    pub session: f64,
}

impl BlendWeights {
    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidWeights`] when any weight is negative or
    /// not finite, or the total is zero.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ConfigError::InvalidWeights)
        }
    }

    const fn as_array(self) -> [f64; 5] {
        [
            self.base,
            self.semantic,
            self.context,
            self.exploration,
            self.session,
        ]
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "validation sums weights to ensure a non-zero total"
    )]
    fn is_valid(self) -> bool {
        let weights = self.as_array();
        weights
            .iter()
            .all(|weight| weight.is_finite() && *weight >= 0.0)
            && weights.iter().sum::<f64>() > 0.0
    }
}

/// Weights and selection parameters for one query type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Signal weights.
    pub weights: BlendWeights,
    /// Softmax temperature for anchor sampling, applied to scores normalised
    /// to `[0, 1]` by the pool maximum.
    pub temperature: f64,
    /// MMR trade-off between relevance (`1`) and diversity (`0`).
    pub mmr_lambda: f64,
    /// Near-duplicate threshold used when filling short anchor lists.
    pub similarity_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: BlendWeights {
                base: 0.4,
                semantic: 0.15,
                context: 0.25,
                exploration: 0.1,
                session: 0.1,
            },
            temperature: 0.15,
            mmr_lambda: 0.7,
            similarity_threshold: 0.75,
        }
    }
}

impl ScoringConfig {
    /// Preset for free-form requests: semantic similarity dominates and
    /// sampling is a little more adventurous.
    #[must_use]
    pub const fn natural_language() -> Self {
        Self {
            weights: BlendWeights {
                base: 0.25,
                semantic: 0.35,
                context: 0.2,
                exploration: 0.1,
                session: 0.1,
            },
            temperature: 0.2,
            mmr_lambda: 0.65,
            similarity_threshold: 0.75,
        }
    }

    /// Validate the configuration and return a copy.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the weights are invalid, the temperature
    /// is not positive, or λ or the threshold leave `[0, 1]`.
    pub fn validate(self) -> Result<Self, ConfigError> {
        self.weights.validate()?;
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(ConfigError::InvalidTemperature {
                value: self.temperature,
            });
        }
        unit_interval("mmr_lambda", self.mmr_lambda)?;
        unit_interval("similarity_threshold", self.similarity_threshold)?;
        Ok(self)
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

/// Tuning for the [`Engine`](crate::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Preset for structured requests.
    pub scoring: ScoringConfig,
    /// Preset for natural-language requests.
    pub natural_language: ScoringConfig,
    /// Number of top-scored candidates fed to softmax sampling.
    pub anchor_pool: usize,
    /// Number of anchors drawn by softmax before MMR.
    pub softmax_sample: usize,
    /// Satellite search radius around each anchor, in kilometres.
    pub satellite_radius_km: f64,
    /// Itineraries returned when the caller gives no limit.
    pub default_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            natural_language: ScoringConfig::natural_language(),
            anchor_pool: 20,
            softmax_sample: 12,
            satellite_radius_km: 1.0,
            default_limit: 3,
        }
    }
}

impl EngineConfig {
    /// Validate both presets and the selection sizes.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(self) -> Result<Self, ConfigError> {
        self.scoring.validate()?;
        self.natural_language.validate()?;
        for (field, size) in [
            ("anchor_pool", self.anchor_pool),
            ("softmax_sample", self.softmax_sample),
            ("default_limit", self.default_limit),
        ] {
            if size == 0 {
                return Err(ConfigError::ZeroSize { field });
            }
        }
        if !self.satellite_radius_km.is_finite() || self.satellite_radius_km <= 0.0 {
            return Err(ConfigError::InvalidRadius {
                value: self.satellite_radius_km,
            });
        }
        Ok(self)
    }

    /// Preset matching the detected query type.
    #[must_use]
    pub const fn scoring_for(&self, natural_language: bool) -> &ScoringConfig {
        if natural_language {
            &self.natural_language
        } else {
            &self.scoring
        }
    }
}
