//! Error types for the monitoring pipeline

use thiserror::Error;

/// Errors raised by the buffer, transform, classifier and stream layers
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Transform requested on a frame shorter than the planned size
    #[error("insufficient data: {available} of {required} samples available")]
    InsufficientData { available: usize, required: usize },

    /// Frame size is zero, not a power of two, or does not match the plan
    #[error("invalid frame size {0}: must be a non-zero power of two matching the transform")]
    InvalidFrameSize(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample source could not produce a value for this tick
    #[error("sample source unavailable: {0}")]
    SourceUnavailable(String),

    /// Result sink refused a published cycle
    #[error("result sink error: {0}")]
    Sink(String),

    #[error("FFT processing failed: {0}")]
    Fft(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MonitorError::InsufficientData {
            available: 10,
            required: 64,
        };
        assert_eq!(err.to_string(), "insufficient data: 10 of 64 samples available");

        let err = MonitorError::InvalidFrameSize(48);
        assert!(err.to_string().contains("48"));
    }
}
