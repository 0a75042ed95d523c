//! Band-pass cascade filter applied to cleaned captures

use crate::buffer::ScanBuffer;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Generic filter trait
pub trait Filter<T: Copy> {
    /// Process a single sample
    fn process_sample(&mut self, input: T) -> T;

    /// Process a buffer of samples
    fn process_buffer(&mut self, input: &[T], output: &mut [T]) -> Result<()> {
        if input.len() != output.len() {
            return Err(CoreError::BufferSizeMismatch {
                expected: input.len(),
                actual: output.len(),
            });
        }

        for (i, sample) in input.iter().enumerate() {
            output[i] = self.process_sample(*sample);
        }

        Ok(())
    }

    /// Reset the filter state
    fn reset(&mut self);
}

/// Transducer center frequency and board sampling frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParameters {
    pub center_frequency_hz: f64,
    pub sampling_frequency_hz: f64,
}

impl Default for SamplingParameters {
    fn default() -> Self {
        Self {
            center_frequency_hz: 5e6,
            sampling_frequency_hz: 1e8,
        }
    }
}

impl SamplingParameters {
    pub fn new(center_frequency_hz: f64, sampling_frequency_hz: f64) -> Result<Self> {
        if !sampling_frequency_hz.is_finite() || sampling_frequency_hz <= 0.0 {
            return Err(CoreError::InvalidSampleRate {
                rate: sampling_frequency_hz,
            });
        }
        if !center_frequency_hz.is_finite()
            || center_frequency_hz <= 0.0
            || center_frequency_hz >= sampling_frequency_hz / 2.0
        {
            return Err(CoreError::InvalidParameter {
                msg: format!("Invalid center frequency: {}", center_frequency_hz),
            });
        }

        Ok(Self {
            center_frequency_hz,
            sampling_frequency_hz,
        })
    }

    pub fn sampling_frequency_mhz(&self) -> f64 {
        self.sampling_frequency_hz / 1e6
    }

    fn matches(&self, center_frequency_hz: f64, sampling_frequency_hz: f64) -> bool {
        let close = |a: f64, b: f64| ((a - b) / b).abs() <= 1e-6;
        close(self.center_frequency_hz, center_frequency_hz)
            && close(self.sampling_frequency_hz, sampling_frequency_hz)
    }
}

/// Second-order section: numerator taps `fir = [b0, b1, b2]`,
/// denominator taps `iir = [1, a1, a2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub fir: [f64; 3],
    pub iir: [f64; 3],
}

/// 5th order Butterworth band-pass around 5 MHz, sampled at 100 MHz
pub const BUTTERWORTH_5MHZ_100MHZ: [BiquadCoefficients; 5] = [
    BiquadCoefficients {
        fir: [5.97957804e-5, 1.19591561e-4, 5.97957804e-5],
        iir: [1.0, -1.57683109, 7.08501861e-1],
    },
    BiquadCoefficients {
        fir: [1.0, 2.0, 1.0],
        iir: [1.0, -1.66250775, 7.26542528e-1],
    },
    BiquadCoefficients {
        fir: [1.0, 0.0, -1.0],
        iir: [1.0, -1.81424532, 8.46857338e-1],
    },
    BiquadCoefficients {
        fir: [1.0, -2.0, 1.0],
        iir: [1.0, -1.67175849, 8.68290217e-1],
    },
    BiquadCoefficients {
        fir: [1.0, -2.0, 1.0],
        iir: [1.0, -1.92597775, 9.509085e-1],
    },
];

/// Look up the precomputed coefficient table for a sampling setup.
///
/// Tables are designed offline; only the 5 MHz / 100 MHz design point
/// exists.
pub fn coefficient_table(params: &SamplingParameters) -> Result<&'static [BiquadCoefficients]> {
    if params.matches(5e6, 1e8) {
        return Ok(&BUTTERWORTH_5MHZ_100MHZ);
    }

    warn!(
        "No filter coefficients for fc={} Hz, fe={} Hz",
        params.center_frequency_hz, params.sampling_frequency_hz
    );
    Err(CoreError::UnsupportedSampling {
        center_frequency_hz: params.center_frequency_hz,
        sampling_frequency_hz: params.sampling_frequency_hz,
    })
}

/// One biquad stage, keeping the last two intermediate values
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    buffer1: f64,
    buffer2: f64,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            buffer1: 0.0,
            buffer2: 0.0,
        }
    }
}

impl Filter<f64> for Biquad {
    fn process_sample(&mut self, input: f64) -> f64 {
        let [b0, b1, b2] = self.coeffs.fir;
        let [_, a1, a2] = self.coeffs.iir;

        let acc_input = input + self.buffer1 * -a1 + self.buffer2 * -a2;
        let acc_output = acc_input * b0 + self.buffer1 * b1 + self.buffer2 * b2;

        self.buffer2 = self.buffer1;
        self.buffer1 = acc_input;

        acc_output
    }

    fn reset(&mut self) {
        self.buffer1 = 0.0;
        self.buffer2 = 0.0;
    }
}

/// Chain of biquad stages; each stage feeds the next
#[derive(Debug, Clone)]
pub struct BiquadCascade {
    stages: Vec<Biquad>,
}

impl BiquadCascade {
    pub fn new(table: &[BiquadCoefficients]) -> Result<Self> {
        if table.is_empty() {
            return Err(CoreError::InvalidParameter {
                msg: "Cascade must have at least one stage".to_string(),
            });
        }

        Ok(Self {
            stages: table.iter().copied().map(Biquad::new).collect(),
        })
    }

    /// Cascade for the coefficient table matching `params`
    pub fn for_sampling(params: &SamplingParameters) -> Result<Self> {
        Self::new(coefficient_table(params)?)
    }

    pub fn order(&self) -> usize {
        self.stages.len()
    }
}

impl Filter<f64> for BiquadCascade {
    fn process_sample(&mut self, input: f64) -> f64 {
        self.stages
            .iter_mut()
            .fold(input, |x, stage| stage.process_sample(x))
    }

    fn reset(&mut self) {
        self.stages.iter_mut().for_each(|stage| stage.reset());
    }
}

/// Filter a cleaned capture with a fresh cascade.
///
/// No settling samples are discarded: the first output samples carry the
/// start-up transient.
pub fn butterworth_filter(input: &ScanBuffer, params: &SamplingParameters) -> Result<ScanBuffer> {
    let mut cascade = BiquadCascade::for_sampling(params)?;
    let mut output = vec![0.0; input.len()];
    cascade.process_buffer(input.data(), &mut output)?;
    ScanBuffer::from_data(output, input.sample_rate())
}
