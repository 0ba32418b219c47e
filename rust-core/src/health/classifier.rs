//! Threshold-based fault classification
//!
//! Two interchangeable rules:
//! - aggregate: every component is judged against the mean magnitude of the
//!   whole spectrum. Frequency location plays no part; this is a coarse
//!   global-energy heuristic kept as its own mode.
//! - band: every component is judged against the magnitude found at its
//!   characteristic frequency.

use super::bands::ComponentBand;
use super::report::{ComponentHealth, HealthReport, HealthStatus};
use crate::spectrum::SpectrumBin;
use log::debug;
use serde::{Deserialize, Serialize};

/// Classification rule selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    Aggregate,
    #[default]
    Band,
}

/// Maps one spectrum to a health report
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaultClassifier {
    /// Mean magnitude against each component's fixed aggregate threshold
    Aggregate { warning_ratio: f64 },

    /// Peak magnitude within `tolerance_bins` bin widths of the band frequency
    /// against the band's own threshold
    Band {
        tolerance_bins: f64,
        warning_ratio: f64,
    },
}

impl FaultClassifier {
    pub fn from_mode(mode: ClassifierMode, tolerance_bins: f64, warning_ratio: f64) -> Self {
        match mode {
            ClassifierMode::Aggregate => FaultClassifier::Aggregate { warning_ratio },
            ClassifierMode::Band => FaultClassifier::Band {
                tolerance_bins,
                warning_ratio,
            },
        }
    }

    pub fn mode(&self) -> ClassifierMode {
        match self {
            FaultClassifier::Aggregate { .. } => ClassifierMode::Aggregate,
            FaultClassifier::Band { .. } => ClassifierMode::Band,
        }
    }

    /// Classify the components named in `bands`
    ///
    /// Returns `None` for an empty spectrum; no status is guessed.
    pub fn classify(&self, bins: &[SpectrumBin], bands: &[ComponentBand]) -> Option<HealthReport> {
        if bins.is_empty() {
            return None;
        }

        let report = match *self {
            FaultClassifier::Aggregate { warning_ratio } => {
                classify_aggregate(bins, bands, warning_ratio)
            }
            FaultClassifier::Band {
                tolerance_bins,
                warning_ratio,
            } => classify_bands(bins, bands, tolerance_bins, warning_ratio),
        };

        Some(report)
    }
}

/// Arithmetic mean of every bin magnitude, DC included
pub fn mean_magnitude(bins: &[SpectrumBin]) -> f64 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|b| b.magnitude).sum::<f64>() / bins.len() as f64
}

fn classify_aggregate(
    bins: &[SpectrumBin],
    bands: &[ComponentBand],
    warning_ratio: f64,
) -> HealthReport {
    let level = mean_magnitude(bins);
    let mut report = HealthReport::new();

    for band in bands {
        let threshold = band.component.aggregate_threshold();
        report.insert(
            band.component,
            ComponentHealth {
                status: HealthStatus::grade(level, threshold, warning_ratio),
                level,
                threshold,
            },
        );
    }

    report
}

fn classify_bands(
    bins: &[SpectrumBin],
    bands: &[ComponentBand],
    tolerance_bins: f64,
    warning_ratio: f64,
) -> HealthReport {
    let mut report = HealthReport::new();

    let Some(bin_width) = bin_width(bins) else {
        debug!("Spectrum has a single bin; no band can be localized");
        return report;
    };
    // Absorbs rounding in k * fs / N
    let tolerance_hz = tolerance_bins * bin_width + bin_width * 1e-9;

    for band in bands {
        let level = bins
            .iter()
            .filter(|b| (b.frequency - band.frequency_hz).abs() <= tolerance_hz)
            .map(|b| b.magnitude)
            .reduce(f64::max);

        match level {
            Some(level) => report.insert(
                band.component,
                ComponentHealth {
                    status: HealthStatus::grade(level, band.threshold, warning_ratio),
                    level,
                    threshold: band.threshold,
                },
            ),
            None => debug!(
                "{} band at {:.2} Hz has no bin within tolerance, left unmonitored",
                band.component, band.frequency_hz
            ),
        }
    }

    report
}

fn bin_width(bins: &[SpectrumBin]) -> Option<f64> {
    match bins {
        [first, second, ..] => Some(second.frequency - first.frequency).filter(|w| *w > 0.0),
        _ => None,
    }
}
