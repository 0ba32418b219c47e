//! Vibration Monitor - Machine Health Core
//!
//! Streams vibration samples through a sliding window, transforms each
//! frame into a spectrum and classifies drive-train component health.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod config;
pub mod error;
pub mod health;
pub mod spectrum;
pub mod stream;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use health::{
    ClassifierMode, Component, ComponentBand, FaultClassifier, HealthReport, HealthStatus,
};
pub use spectrum::{SpectralTransform, SpectrumBin};
pub use stream::{SampleBuffer, StreamScheduler, StreamSession};
