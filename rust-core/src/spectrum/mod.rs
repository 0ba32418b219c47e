//! Spectral analysis with FFT

pub mod fft;
pub mod windowing;
pub mod analysis;

pub use fft::FftEngine;
pub use windowing::WindowType;
pub use analysis::{MagnitudeScale, SpectralTransform, SpectrumBin, TransformConfig};
