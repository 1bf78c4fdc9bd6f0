//! Engine timing and scoring configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scoring::ScoringRules;

/// Configuration for the drill engine.
///
/// Every field has a default, so a partial `[engine]` table in a config file
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Point values and badge thresholds.
    pub scoring: ScoringRules,
    /// Lead-in ticks before the first question.
    pub countdown_ticks: u32,
    /// Length of one countdown tick in milliseconds.
    pub tick_interval_ms: u64,
    /// Feedback pause after an answer.
    pub answer_pause_ms: u64,
    /// Feedback pause after a timeout.
    pub timeout_pause_ms: u64,
    /// How long to wait for the background asset before starting anyway.
    pub preload_timeout_ms: u64,
    /// Remaining seconds at or below which the clock is shown as urgent.
    pub low_time_threshold_secs: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringRules::default(),
            countdown_ticks: 3,
            tick_interval_ms: 1000,
            answer_pause_ms: 1500,
            timeout_pause_ms: 1000,
            preload_timeout_ms: 5000,
            low_time_threshold_secs: 5,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::new("tick_interval_ms", "must be positive"));
        }
        self.scoring.validate()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn answer_pause(&self) -> Duration {
        Duration::from_millis(self.answer_pause_ms)
    }

    pub fn timeout_pause(&self) -> Duration {
        Duration::from_millis(self.timeout_pause_ms)
    }

    pub fn preload_timeout(&self) -> Duration {
        Duration::from_millis(self.preload_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.countdown_ticks, 3);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.answer_pause(), Duration::from_millis(1500));
        assert!(config.timeout_pause() < config.answer_pause());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
countdown_ticks = 5

[scoring]
speed_badge_ratio = 0.9
"#,
        )
        .unwrap();
        assert_eq!(config.countdown_ticks, 5);
        assert_eq!(config.scoring.speed_badge_ratio, 0.9);
        assert_eq!(config.scoring.correct_points, 50);
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    fn zero_tick_interval_rejected() {
        let config = EngineConfig {
            tick_interval_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "tick_interval_ms");
    }
}
