//! Spectral transform
//!
//! Combines the FFT engine with windowing to turn one frame into a
//! Nyquist-limited list of frequency/magnitude bins

use super::fft::FftEngine;
use super::windowing::{apply_window, coherent_gain, generate_window, WindowType};
use crate::error::{MonitorError, Result};
use crate::stream::buffer::Frame;
use serde::{Deserialize, Serialize};

/// One frequency/magnitude pair of a computed spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumBin {
    /// Bin centre frequency in Hz
    pub frequency: f64,

    /// Non-negative magnitude in the configured scale
    pub magnitude: f64,
}

/// How |X[k]| is scaled before it is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeScale {
    /// Modulus of the complex coefficient
    #[default]
    Raw,

    /// Modulus divided by the frame length
    Normalized,

    /// Single-sided amplitude corrected for the window's coherent gain;
    /// a bin-centred tone of amplitude A reads as A
    Amplitude,
}

/// Spectral transform configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformConfig {
    /// Frame length N (power of two)
    pub frame_size: usize,

    /// Window applied before the FFT
    pub window_type: WindowType,

    /// Magnitude scaling
    pub scale: MagnitudeScale,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            frame_size: 64,
            window_type: WindowType::Hann,
            scale: MagnitudeScale::Raw,
        }
    }
}

/// Windowed real FFT producing N/2 bins
///
/// Holds no state between calls beyond the plan and window for N, so the
/// same frame and sample rate always produce the same spectrum.
pub struct SpectralTransform {
    config: TransformConfig,
    fft_engine: FftEngine,
    window: Vec<f64>,
    window_sum: f64,
}

impl SpectralTransform {
    /// Create a transform for frames of `config.frame_size` samples
    pub fn new(config: TransformConfig) -> Result<Self> {
        let fft_engine = FftEngine::new(config.frame_size)?;
        let window = generate_window(config.window_type, config.frame_size);
        let window_sum = coherent_gain(&window);

        Ok(Self {
            config,
            fft_engine,
            window,
            window_sum,
        })
    }

    /// Transform one frame into an ascending list of N/2 bins
    ///
    /// # Arguments
    /// * `frame` - Exactly N samples, oldest first
    /// * `sample_rate_hz` - Rate the samples were taken at
    ///
    /// # Returns
    /// Bins k = 0..N/2, frequency k * fs / N; bin 0 is DC
    pub fn transform(&mut self, frame: &Frame, sample_rate_hz: f64) -> Result<Vec<SpectrumBin>> {
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(MonitorError::InvalidConfig(format!(
                "sample rate must be positive, got {sample_rate_hz}"
            )));
        }

        let n = self.config.frame_size;
        if frame.len() < n {
            return Err(MonitorError::InsufficientData {
                available: frame.len(),
                required: n,
            });
        }
        if frame.len() > n {
            return Err(MonitorError::InvalidFrameSize(frame.len()));
        }

        let windowed = apply_window(frame.as_slice(), &self.window);
        let moduli = self.fft_engine.compute_magnitude(&windowed)?;

        // The Nyquist coefficient (index N/2) mirrors nothing new and is dropped
        let bins = moduli
            .iter()
            .take(n / 2)
            .enumerate()
            .map(|(k, &modulus)| SpectrumBin {
                frequency: self.fft_engine.bin_to_hz(k, sample_rate_hz),
                magnitude: self.scale_magnitude(k, modulus),
            })
            .collect();

        Ok(bins)
    }

    fn scale_magnitude(&self, bin: usize, modulus: f64) -> f64 {
        match self.config.scale {
            MagnitudeScale::Raw => modulus,
            MagnitudeScale::Normalized => modulus / self.config.frame_size as f64,
            MagnitudeScale::Amplitude => {
                if self.window_sum <= 0.0 {
                    return 0.0;
                }
                // DC has no mirrored negative-frequency half
                let single_sided = if bin == 0 { 1.0 } else { 2.0 };
                single_sided * modulus / self.window_sum
            }
        }
    }

    /// Number of bins produced per frame
    pub fn num_bins(&self) -> usize {
        self.config.frame_size / 2
    }

    /// Frame length this transform was planned for
    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    /// Get current configuration
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }
}

/// Index of the bin with the largest magnitude, ignoring DC
pub fn peak_bin(bins: &[SpectrumBin]) -> Option<usize> {
    bins.iter()
        .enumerate()
        .skip(1)
        .max_by(|(_, a), (_, b)| a.magnitude.total_cmp(&b.magnitude))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine_frame(n: usize, freq_hz: f64, sample_rate: f64, amplitude: f64) -> Frame {
        Frame::from(
            (0..n)
                .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / sample_rate).sin())
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_bin_count_and_ordering() {
        for exp in 1..=12 {
            let n = 1usize << exp;
            let mut transform = SpectralTransform::new(TransformConfig {
                frame_size: n,
                ..Default::default()
            })
            .unwrap();

            let bins = transform
                .transform(&sine_frame(n, 10.0, 1000.0, 1.0), 1000.0)
                .unwrap();

            assert_eq!(bins.len(), n / 2);
            assert_eq!(bins[0].frequency, 0.0);
            assert!(bins.windows(2).all(|w| w[0].frequency < w[1].frequency));
            assert!(bins.iter().all(|b| b.magnitude >= 0.0));
            assert!(bins.last().unwrap().frequency < 500.0);
        }
    }

    #[test]
    fn test_sine_peak_at_125hz() {
        let mut transform = SpectralTransform::new(TransformConfig::default()).unwrap();

        let bins = transform
            .transform(&sine_frame(64, 125.0, 500.0, 1.0), 500.0)
            .unwrap();

        let peak = peak_bin(&bins).unwrap();
        assert_eq!(peak, 16);
        assert!((bins[peak].frequency - 125.0).abs() < 1e-9);

        // Hann main lobe: direct neighbours sit near half the peak
        assert!(bins[peak].magnitude > 1.5 * bins[15].magnitude);
        assert!(bins[peak].magnitude > 1.5 * bins[17].magnitude);
        assert!(bins[peak].magnitude > 10.0 * bins[10].magnitude);
    }

    #[test]
    fn test_peak_tracks_bin_centred_tones() {
        let mut transform = SpectralTransform::new(TransformConfig {
            frame_size: 256,
            ..Default::default()
        })
        .unwrap();
        let sample_rate = 1000.0;
        let bin_width = sample_rate / 256.0;

        for k in [3usize, 20, 64, 100, 120] {
            let f = k as f64 * bin_width;
            let bins = transform
                .transform(&sine_frame(256, f, sample_rate, 1.0), sample_rate)
                .unwrap();
            let peak = peak_bin(&bins).unwrap();
            assert!((bins[peak].frequency - f).abs() <= bin_width);
        }
    }

    #[test]
    fn test_amplitude_scale_recovers_amplitude() {
        let mut transform = SpectralTransform::new(TransformConfig {
            frame_size: 1024,
            scale: MagnitudeScale::Amplitude,
            ..Default::default()
        })
        .unwrap();

        let bins = transform
            .transform(&sine_frame(1024, 125.0, 1024.0, 0.5), 1024.0)
            .unwrap();

        assert!((bins[125].magnitude - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_raw_and_normalized_scales() {
        let frame = sine_frame(64, 125.0, 500.0, 1.0);

        let mut raw = SpectralTransform::new(TransformConfig {
            scale: MagnitudeScale::Raw,
            ..Default::default()
        })
        .unwrap();
        let mut normalized = SpectralTransform::new(TransformConfig {
            scale: MagnitudeScale::Normalized,
            ..Default::default()
        })
        .unwrap();

        let raw_bins = raw.transform(&frame, 500.0).unwrap();
        let norm_bins = normalized.transform(&frame, 500.0).unwrap();

        for (r, n) in raw_bins.iter().zip(norm_bins.iter()) {
            assert!((r.magnitude / 64.0 - n.magnitude).abs() < 1e-12);
        }
    }

    #[test]
    fn test_deterministic() {
        let mut transform = SpectralTransform::new(TransformConfig::default()).unwrap();
        let frame = sine_frame(64, 60.0, 500.0, 0.7);

        let first = transform.transform(&frame, 500.0).unwrap();
        let second = transform.transform(&frame, 500.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_frame_rejected() {
        let mut transform = SpectralTransform::new(TransformConfig::default()).unwrap();
        let frame = Frame::from(vec![0.0; 63]);

        assert!(matches!(
            transform.transform(&frame, 500.0),
            Err(MonitorError::InsufficientData { available: 63, required: 64 })
        ));
    }

    #[test]
    fn test_long_frame_rejected() {
        let mut transform = SpectralTransform::new(TransformConfig::default()).unwrap();
        let frame = Frame::from(vec![0.0; 128]);

        assert!(matches!(
            transform.transform(&frame, 500.0),
            Err(MonitorError::InvalidFrameSize(128))
        ));
    }

    #[test]
    fn test_invalid_sample_rate() {
        let mut transform = SpectralTransform::new(TransformConfig::default()).unwrap();
        let frame = Frame::from(vec![0.0; 64]);

        assert!(matches!(
            transform.transform(&frame, 0.0),
            Err(MonitorError::InvalidConfig(_))
        ));
    }
}
