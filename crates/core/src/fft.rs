//! FFT processing wrapper

use crate::{buffer::Complex, CoreError, Result};
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{num_complex::Complex64, FftPlanner};
use std::sync::Arc;

/// FFT configuration
#[derive(Debug, Clone)]
pub struct FftConfig {
    pub size: usize,
    pub sample_rate: f64,
}

impl FftConfig {
    pub fn new(size: usize, sample_rate: f64) -> Result<Self> {
        if size == 0 || !size.is_power_of_two() {
            return Err(CoreError::FftError {
                msg: format!("FFT size must be a power of 2, got {}", size),
            });
        }

        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self { size, sample_rate })
    }

    /// Get frequency resolution (Hz per bin)
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate / self.size as f64
    }

    /// Convert frequency in Hz to bin index
    pub fn frequency_to_bin(&self, frequency: f64) -> usize {
        (frequency / self.frequency_resolution()).round() as usize
    }
}

/// Forward real FFT and inverse complex FFT of one fixed size
pub struct FftProcessor {
    config: FftConfig,
    r2c: Arc<dyn RealToComplex<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    scratch: Vec<f64>,
}

impl FftProcessor {
    /// Create a new FFT processor
    pub fn new(config: FftConfig) -> Result<Self> {
        let r2c = RealFftPlanner::<f64>::new().plan_fft_forward(config.size);
        let ifft = FftPlanner::new().plan_fft_inverse(config.size);
        let scratch = r2c.make_input_vec();

        Ok(Self {
            config,
            r2c,
            ifft,
            scratch,
        })
    }

    /// Get the FFT configuration
    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    /// Forward transform of a real signal, returning the `size / 2 + 1`
    /// non-negative frequency bins
    pub fn forward_real(&mut self, input: &[f64]) -> Result<Vec<Complex>> {
        if input.len() != self.config.size {
            return Err(CoreError::BufferSizeMismatch {
                expected: self.config.size,
                actual: input.len(),
            });
        }

        // realfft uses its input as scratch space
        self.scratch.copy_from_slice(input);
        let mut spectrum = self.r2c.make_output_vec();
        self.r2c
            .process(&mut self.scratch, &mut spectrum)
            .map_err(|e| CoreError::FftError { msg: e.to_string() })?;

        Ok(spectrum.into_iter().map(Complex::from).collect())
    }

    /// Normalised inverse transform of a full complex spectrum
    pub fn inverse(&mut self, spectrum: &[Complex]) -> Result<Vec<Complex>> {
        if spectrum.len() != self.config.size {
            return Err(CoreError::BufferSizeMismatch {
                expected: self.config.size,
                actual: spectrum.len(),
            });
        }

        let mut buffer: Vec<Complex64> = spectrum.iter().copied().map(Complex64::from).collect();
        self.ifft.process(&mut buffer);

        let scale = 1.0 / self.config.size as f64;
        Ok(buffer
            .into_iter()
            .map(|c| Complex::new(c.re * scale, c.im * scale))
            .collect())
    }
}
