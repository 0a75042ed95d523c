//! Fixed-length sample buffers

use crate::{CoreError, Result};
use serde::Serialize;
use std::ops::{Index, IndexMut};

/// Number of samples in every processed capture
pub const BUFFER_LENGTH: usize = 2048;

/// Largest amplitude the acquisition board can legitimately report
pub const MAX_VALUE: f64 = 20000.0;

/// Sample buffer holding exactly [`BUFFER_LENGTH`] samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleBuffer<T> {
    data: Vec<T>,
    sample_rate: f64,
}

impl<T> SampleBuffer<T>
where
    T: Clone + Default,
{
    /// Create a zero-filled buffer at the given sample rate (Hz)
    pub fn new(sample_rate: f64) -> Result<Self> {
        Self::from_data(vec![T::default(); BUFFER_LENGTH], sample_rate)
    }

    /// Create a buffer from existing data
    pub fn from_data(data: Vec<T>, sample_rate: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        if data.len() != BUFFER_LENGTH {
            return Err(CoreError::BufferSizeMismatch {
                expected: BUFFER_LENGTH,
                actual: data.len(),
            });
        }

        Ok(Self { data, sample_rate })
    }
}

impl<T> SampleBuffer<T> {
    /// Get the sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Get the number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total capture duration in microseconds
    pub fn duration_us(&self) -> f64 {
        self.data.len() as f64 / (self.sample_rate / 1e6)
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Consume the buffer, returning the samples
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

impl<T> Index<usize> for SampleBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for SampleBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// Complex sample, used for spectra and the analytic signal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex {
    pub real: f64,
    pub imag: f64,
}

impl Complex {
    pub fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }

    pub fn magnitude(&self) -> f64 {
        (self.real * self.real + self.imag * self.imag).sqrt()
    }

    pub fn norm_sqr(&self) -> f64 {
        self.real * self.real + self.imag * self.imag
    }
}

impl std::ops::Mul<f64> for Complex {
    type Output = Complex;

    fn mul(self, rhs: f64) -> Self::Output {
        Complex::new(self.real * rhs, self.imag * rhs)
    }
}

impl From<rustfft::num_complex::Complex64> for Complex {
    fn from(c: rustfft::num_complex::Complex64) -> Self {
        Complex::new(c.re, c.im)
    }
}

impl From<Complex> for rustfft::num_complex::Complex64 {
    fn from(c: Complex) -> Self {
        rustfft::num_complex::Complex64::new(c.real, c.imag)
    }
}

/// Cleaned or filtered capture
pub type ScanBuffer = SampleBuffer<f64>;

/// Integer A-scan curve handed to the rendering layer
pub type Envelope = SampleBuffer<u32>;
