//! FFT engine using realfft for real-valued frames
//!
//! Planned once per frame size and reused for every cycle

use crate::error::{MonitorError, Result};
use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Check that `size` is a usable transform length (power of two, at least 2)
pub fn validate_frame_size(size: usize) -> Result<()> {
    if size < 2 || !size.is_power_of_two() {
        return Err(MonitorError::InvalidFrameSize(size));
    }
    Ok(())
}

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer (realfft scrambles its input)
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum, N/2 + 1 bins)
    output_buffer: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size, a power of two
    pub fn new(fft_size: usize) -> Result<Self> {
        validate_frame_size(fft_size)?;

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();

        Ok(Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
        })
    }

    /// Compute FFT and return the modulus of every non-negative frequency bin
    ///
    /// # Arguments
    /// * `signal` - Exactly `fft_size` samples; shorter input is rejected, never zero-padded
    ///
    /// # Returns
    /// |X[k]| for k = 0..=fft_size/2
    pub fn compute_magnitude(&mut self, signal: &[f64]) -> Result<Vec<f64>> {
        if signal.len() < self.fft_size {
            return Err(MonitorError::InsufficientData {
                available: signal.len(),
                required: self.fft_size,
            });
        }
        if signal.len() > self.fft_size {
            return Err(MonitorError::InvalidFrameSize(signal.len()));
        }

        self.input_buffer.copy_from_slice(signal);

        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .map_err(|e| MonitorError::Fft(e.to_string()))?;

        Ok(self.output_buffer.iter().map(|c| c.norm()).collect())
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Width of one bin in Hz
    pub fn bin_width_hz(&self, sample_rate_hz: f64) -> f64 {
        sample_rate_hz / self.fft_size as f64
    }

    /// Centre frequency of `bin` in Hz
    pub fn bin_to_hz(&self, bin: usize, sample_rate_hz: f64) -> f64 {
        bin as f64 * self.bin_width_hz(sample_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rejects_bad_sizes() {
        for size in [0, 1, 3, 48, 100] {
            assert!(matches!(
                FftEngine::new(size),
                Err(MonitorError::InvalidFrameSize(s)) if s == size
            ));
        }
        assert!(FftEngine::new(64).is_ok());
    }

    #[test]
    fn test_fft_dc_signal() {
        let mut fft = FftEngine::new(64).unwrap();

        let spectrum = fft.compute_magnitude(&vec![1.0; 64]).unwrap();

        assert_eq!(spectrum.len(), 33);
        assert!((spectrum[0] - 64.0).abs() < 1e-9);
        assert!(spectrum[1..].iter().all(|&m| m < 1e-9));
    }

    #[test]
    fn test_fft_sine_wave() {
        let mut fft = FftEngine::new(1024).unwrap();

        // Exactly 100 cycles across the frame
        let signal: Vec<f64> = (0..1024)
            .map(|n| (2.0 * PI * 100.0 * n as f64 / 1024.0).sin())
            .collect();

        let spectrum = fft.compute_magnitude(&signal).unwrap();

        let (peak_bin, &peak_mag) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert_eq!(peak_bin, 100);
        // N/2 for a unit sine
        assert!((peak_mag - 512.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_signal_is_not_padded() {
        let mut fft = FftEngine::new(64).unwrap();
        let err = fft.compute_magnitude(&[0.0; 10]).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::InsufficientData { available: 10, required: 64 }
        ));
    }

    #[test]
    fn test_bin_frequencies() {
        let fft = FftEngine::new(64).unwrap();
        assert!((fft.bin_width_hz(500.0) - 7.8125).abs() < 1e-12);
        assert!((fft.bin_to_hz(16, 500.0) - 125.0).abs() < 1e-12);
    }
}
