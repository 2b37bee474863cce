use serde::{Deserialize, Serialize};

use crate::srs::types::ConfidenceLevel;
use crate::srs::SrsError;

/// Ease-factor adjustment applied per confidence level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EaseDelta {
    pub very_hard: f64,
    pub hard: f64,
    pub good: f64,
    pub easy: f64,
    pub very_easy: f64,
}

impl Default for EaseDelta {
    fn default() -> Self {
        Self {
            very_hard: -0.30,
            hard: -0.15,
            good: 0.0,
            easy: 0.10,
            very_easy: 0.15,
        }
    }
}

/// Interval growth factors for successful reviews past the fixed first and
/// second steps. `hard` is a flat multiplier; `easy`/`very_easy` are bonuses
/// applied on top of the ease factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalMultipliers {
    pub hard: f64,
    pub easy_bonus: f64,
    pub very_easy_bonus: f64,
}

impl Default for IntervalMultipliers {
    fn default() -> Self {
        Self {
            hard: 1.2,
            easy_bonus: 1.3,
            very_easy_bonus: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsConfig {
    pub initial_interval_days: f64,
    /// Fixed second-step interval, the standard SM-2 convention.
    pub second_interval_days: f64,
    pub minimum_interval_days: f64,
    pub initial_ease_factor: f64,
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
    pub ease_delta: EaseDelta,
    pub interval_multipliers: IntervalMultipliers,
    /// Responses below this level are lapses for scheduling purposes.
    pub lapse_threshold: ConfidenceLevel,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            initial_interval_days: 1.0,
            second_interval_days: 6.0,
            minimum_interval_days: 1.0,
            initial_ease_factor: 2.5,
            min_ease_factor: 1.3,
            max_ease_factor: 3.0,
            ease_delta: EaseDelta::default(),
            interval_multipliers: IntervalMultipliers::default(),
            lapse_threshold: ConfidenceLevel::Good,
        }
    }
}

impl SrsConfig {
    pub fn from_env(env_config: &crate::config::SrsEnvConfig) -> Self {
        let mut config = Self::default();
        config.initial_interval_days = env_config.initial_interval_days;
        config.min_ease_factor = env_config.min_ease_factor;
        config.max_ease_factor = env_config.max_ease_factor;
        config
    }

    pub fn validate(&self) -> Result<(), SrsError> {
        if self.initial_interval_days <= 0.0 {
            return Err(SrsError::Configuration(
                "initialIntervalDays must be > 0".to_string(),
            ));
        }
        if self.second_interval_days < self.initial_interval_days {
            return Err(SrsError::Configuration(
                "secondIntervalDays must be >= initialIntervalDays".to_string(),
            ));
        }
        if self.minimum_interval_days <= 0.0
            || self.minimum_interval_days > self.initial_interval_days
        {
            return Err(SrsError::Configuration(
                "minimumIntervalDays must be in (0, initialIntervalDays]".to_string(),
            ));
        }
        if self.min_ease_factor <= 0.0 {
            return Err(SrsError::Configuration(
                "minEaseFactor must be > 0".to_string(),
            ));
        }
        if self.min_ease_factor > self.max_ease_factor {
            return Err(SrsError::Configuration(
                "minEaseFactor must be <= maxEaseFactor".to_string(),
            ));
        }
        if self.initial_ease_factor < self.min_ease_factor
            || self.initial_ease_factor > self.max_ease_factor
        {
            return Err(SrsError::Configuration(
                "initialEaseFactor must be within [minEaseFactor, maxEaseFactor]".to_string(),
            ));
        }
        if self.interval_multipliers.hard <= 0.0
            || self.interval_multipliers.easy_bonus <= 0.0
            || self.interval_multipliers.very_easy_bonus <= 0.0
        {
            return Err(SrsError::Configuration(
                "interval multipliers must be > 0".to_string(),
            ));
        }
        let deltas = [
            self.ease_delta.very_hard,
            self.ease_delta.hard,
            self.ease_delta.good,
            self.ease_delta.easy,
            self.ease_delta.very_easy,
        ];
        if deltas.iter().any(|d| !d.is_finite()) {
            return Err(SrsError::Configuration(
                "ease deltas must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn ease_delta_for(&self, confidence: ConfidenceLevel) -> f64 {
        match confidence {
            ConfidenceLevel::VeryHard => self.ease_delta.very_hard,
            ConfidenceLevel::Hard => self.ease_delta.hard,
            ConfidenceLevel::Good => self.ease_delta.good,
            ConfidenceLevel::Easy => self.ease_delta.easy,
            ConfidenceLevel::VeryEasy => self.ease_delta.very_easy,
        }
    }

    /// Interval multiplier for a *successful* review (confidence at or above
    /// the lapse threshold). With the default threshold only GOOD and above
    /// reach this; the `hard` multiplier applies when a deployment lowers the
    /// threshold below GOOD.
    pub(crate) fn success_multiplier(&self, confidence: ConfidenceLevel, ease_factor: f64) -> f64 {
        match confidence {
            ConfidenceLevel::VeryHard => 1.0,
            ConfidenceLevel::Hard => self.interval_multipliers.hard,
            ConfidenceLevel::Good => ease_factor,
            ConfidenceLevel::Easy => ease_factor * self.interval_multipliers.easy_bonus,
            ConfidenceLevel::VeryEasy => ease_factor * self.interval_multipliers.very_easy_bonus,
        }
    }
}
