//! Stream session configuration
//!
//! Loaded from TOML; every field has a default so partial files work.
//!
//! ```toml
//! frame_size = 64
//! sample_rate_hz = 500.0
//! tick_interval_ms = 10
//! classifier_mode = "band"
//!
//! [[component_bands]]
//! component = "motor"
//! frequency_hz = 60.0
//! threshold = 12.5
//! ```

use crate::error::{MonitorError, Result};
use crate::health::{default_bands, ClassifierMode, ComponentBand, FaultClassifier};
use crate::spectrum::fft::validate_frame_size;
use crate::spectrum::{MagnitudeScale, TransformConfig, WindowType};
use crate::stream::source::SyntheticConfig;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Options recognized by a stream session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Frame length N (power of two)
    pub frame_size: usize,

    /// Rate the sensor is sampled at in Hz
    pub sample_rate_hz: f64,

    /// Scheduler tick period in milliseconds (one sample per tick)
    pub tick_interval_ms: u64,

    /// Samples pushed between transform cycles once the buffer is full
    pub hop_size: usize,

    pub window: WindowType,

    pub scale: MagnitudeScale,

    pub classifier_mode: ClassifierMode,

    /// Band search half-width in bins
    pub band_tolerance_bins: f64,

    /// Fraction of a threshold above which a component is in warning
    pub warning_ratio: f64,

    pub component_bands: Vec<ComponentBand>,

    /// Generator used on its own or as fallback when the live feed drops
    pub synthetic: SyntheticConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            frame_size: 64,
            sample_rate_hz: 500.0,
            tick_interval_ms: 10,
            hop_size: 1,
            window: WindowType::Hann,
            scale: MagnitudeScale::Raw,
            classifier_mode: ClassifierMode::Band,
            band_tolerance_bins: 0.5,
            warning_ratio: 0.8,
            component_bands: default_bands(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: MonitorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check ranges and cross-field constraints
    pub fn validate(&self) -> Result<()> {
        validate_frame_size(self.frame_size)?;

        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(invalid(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms must be at least 1".to_string()));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(invalid(format!(
                "hop_size must be between 1 and frame_size ({}), got {}",
                self.frame_size, self.hop_size
            )));
        }
        if !(self.band_tolerance_bins.is_finite() && self.band_tolerance_bins >= 0.0) {
            return Err(invalid(format!(
                "band_tolerance_bins must be non-negative, got {}",
                self.band_tolerance_bins
            )));
        }
        if !(self.warning_ratio > 0.0 && self.warning_ratio <= 1.0) {
            return Err(invalid(format!(
                "warning_ratio must be in (0, 1], got {}",
                self.warning_ratio
            )));
        }

        let mut seen = HashSet::new();
        for band in &self.component_bands {
            if !seen.insert(band.component) {
                return Err(invalid(format!("duplicate band for {}", band.component)));
            }
            if !(band.frequency_hz.is_finite() && band.frequency_hz >= 0.0) {
                return Err(invalid(format!(
                    "{} band frequency must be non-negative, got {}",
                    band.component, band.frequency_hz
                )));
            }
            if !(band.threshold.is_finite() && band.threshold >= 0.0) {
                return Err(invalid(format!(
                    "{} threshold must be non-negative, got {}",
                    band.component, band.threshold
                )));
            }
            if band.frequency_hz >= self.nyquist_hz() {
                warn!(
                    "{} band at {} Hz is at or above Nyquist ({} Hz) and will not be monitored",
                    band.component,
                    band.frequency_hz,
                    self.nyquist_hz()
                );
            }
        }

        self.synthetic.validate()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn bin_width_hz(&self) -> f64 {
        self.sample_rate_hz / self.frame_size as f64
    }

    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate_hz / 2.0
    }

    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            frame_size: self.frame_size,
            window_type: self.window,
            scale: self.scale,
        }
    }

    pub fn classifier(&self) -> FaultClassifier {
        FaultClassifier::from_mode(
            self.classifier_mode,
            self.band_tolerance_bins,
            self.warning_ratio,
        )
    }
}

fn invalid(message: String) -> MonitorError {
    MonitorError::InvalidConfig(message)
}
