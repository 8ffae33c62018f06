//! Reporting configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use vitalis_signals::RrConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Per-connection reporting parameters.
///
/// Defaults match the production values: 1 Hz cadence, 10 s warm-up, 10 s
/// of accumulated signal, SQI threshold 0.5, 30 s BVP window, history of 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Minimum interval between report ticks (seconds)
    pub report_interval_s: f32,
    /// Settling time after connection start before any attempt (seconds)
    pub warmup_s: f32,
    /// Accumulated signal required before any attempt (seconds at fps)
    pub min_signal_s: f32,
    /// Minimum SQI for the RR estimator to run on a tick
    pub min_sqi: f32,
    /// Trailing window for the model's HR estimate (seconds)
    pub hr_window_s: f32,
    /// Trailing BVP window handed to the RR estimator (seconds)
    pub bvp_window_s: f32,
    /// Capacity of the RR smoothing history
    pub history_len: usize,
    /// Respiration estimator parameters
    pub rr: RrConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_interval_s: 1.0,
            warmup_s: 10.0,
            min_signal_s: 10.0,
            min_sqi: 0.5,
            hr_window_s: 10.0,
            bvp_window_s: 30.0,
            history_len: 5,
            rr: RrConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Load and validate a TOML config file. Missing keys fall back to the
    /// defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_interval_s <= 0.0 {
            return Err(ConfigError::Validation(
                "report_interval_s must be positive".into(),
            ));
        }
        if self.warmup_s < 0.0 || self.min_signal_s < 0.0 {
            return Err(ConfigError::Validation(
                "warmup_s and min_signal_s must be non-negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_sqi) {
            return Err(ConfigError::Validation("min_sqi must be in [0, 1]".into()));
        }
        if self.hr_window_s <= 0.0 || self.bvp_window_s <= 0.0 {
            return Err(ConfigError::Validation(
                "hr_window_s and bvp_window_s must be positive".into(),
            ));
        }
        if self.history_len == 0 {
            return Err(ConfigError::Validation(
                "history_len must be at least 1".into(),
            ));
        }
        if !(self.rr.rr_low_hz > 0.0 && self.rr.rr_low_hz < self.rr.rr_high_hz) {
            return Err(ConfigError::Validation(
                "require 0 < rr_low_hz < rr_high_hz".into(),
            ));
        }
        Ok(())
    }
}
