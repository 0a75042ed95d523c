//! Error types for Umit Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Empty sample buffer")]
    EmptyInput,

    #[error("Invalid sample at index {index}: {value}")]
    InvalidSample { index: usize, value: f64 },

    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: f64 },

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error(
        "No filter coefficients for center frequency {center_frequency_hz} Hz \
         at sampling frequency {sampling_frequency_hz} Hz"
    )]
    UnsupportedSampling {
        center_frequency_hz: f64,
        sampling_frequency_hz: f64,
    },

    #[error("Invalid parameter: {msg}")]
    InvalidParameter { msg: String },

    #[error("FFT error: {msg}")]
    FftError { msg: String },
}

/// Result type for Umit Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
