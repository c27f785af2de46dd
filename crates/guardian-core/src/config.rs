//! Runtime configuration.
//!
//! Every timing constant and probability the page runtime uses lives here,
//! with defaults matching the shipped site. Configuration can be supplied as
//! JSON (the browser shell reads an inline `<script type="application/json">`
//! block) or TOML; missing fields fall back to their defaults.
//!
//! ```
//! use guardian_core::GuardianConfig;
//!
//! let config = GuardianConfig::from_toml_str("[scheduler]\npulse_probability = 0.5\n").unwrap();
//! assert_eq!(config.scheduler.pulse_probability, 0.5);
//! assert_eq!(config.scheduler.stats_interval_ms, 30_000);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Timers, probabilities and animation parameters.
    pub scheduler: SchedulerConfig,
    /// Page interaction parameters.
    pub page: PageConfig,
}

/// Parameters of the viewport activity scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Throttle window for scroll sampling.
    pub scroll_throttle_ms: u32,
    /// Added to the scroll offset before testing section spans.
    pub look_ahead_px: f64,
    /// Period of the live statistic loop.
    pub stats_interval_ms: u32,
    /// Chance that a given statistic mutates on one fire.
    pub stat_mutation_probability: f64,
    /// Smallest delta that can be drawn.
    pub stat_delta_min: i64,
    /// Number of distinct deltas; draws cover `[min, min + span - 1]`.
    pub stat_delta_span: u32,
    /// Duration of a value-change animation.
    pub animation_duration_ms: u32,
    /// Period of the alert card pulse loop.
    pub pulse_interval_ms: u32,
    /// Chance that a given alert card pulses on one fire.
    pub pulse_probability: f64,
    /// How long a pulse keeps its emphasis.
    pub pulse_hold_ms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: 100,
            look_ahead_px: 100.0,
            stats_interval_ms: 30_000,
            stat_mutation_probability: 0.3,
            stat_delta_min: -20,
            stat_delta_span: 100,
            animation_duration_ms: 1000,
            pulse_interval_ms: 10_000,
            pulse_probability: 0.1,
            pulse_hold_ms: 300,
        }
    }
}

/// Parameters of the click handlers and browser extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Height of the fixed header subtracted from anchor scroll targets.
    pub header_offset_px: f64,
    /// Vibration pattern played on an emergency click.
    pub vibrate_pattern: Vec<u32>,
    /// Visible fraction that reveals an animated grid.
    pub reveal_threshold: f64,
    /// Root margin of the reveal observer.
    pub reveal_root_margin: String,
    /// Service worker script; `None` disables registration.
    pub service_worker: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            header_offset_px: 80.0,
            vibrate_pattern: vec![200, 100, 200],
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px".to_string(),
            service_worker: Some("/sw.js".to_string()),
        }
    }
}

impl GuardianConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scheduler;
        probability("stat_mutation_probability", s.stat_mutation_probability)?;
        probability("pulse_probability", s.pulse_probability)?;
        positive("scroll_throttle_ms", s.scroll_throttle_ms)?;
        positive("stats_interval_ms", s.stats_interval_ms)?;
        positive("animation_duration_ms", s.animation_duration_ms)?;
        positive("pulse_interval_ms", s.pulse_interval_ms)?;
        positive("stat_delta_span", s.stat_delta_span)?;
        if !s.look_ahead_px.is_finite() {
            return Err(ConfigError::Invalid {
                field: "look_ahead_px",
                reason: "must be finite".to_string(),
            });
        }
        probability("reveal_threshold", self.page.reveal_threshold)?;
        Ok(())
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

fn positive(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".to_string(),
        })
    }
}
