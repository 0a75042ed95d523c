//! Envelope extraction through the discrete Hilbert transform

use crate::buffer::{Complex, ScanBuffer};
use crate::fft::{FftConfig, FftProcessor};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the analytic signal is reduced to the A-scan curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvelopeMode {
    /// `|re|` of the analytic signal, the curve operators are used to.
    /// The real part of the analytic signal is the filtered signal itself,
    /// so this is a rectified trace rather than a smooth envelope.
    #[default]
    RealPart,
    /// `sqrt(re² + im²)`, the textbook envelope
    Magnitude,
}

impl FromStr for EnvelopeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "real" | "real-part" | "legacy" => Ok(EnvelopeMode::RealPart),
            "magnitude" | "abs" | "envelope" => Ok(EnvelopeMode::Magnitude),
            _ => Err(CoreError::InvalidParameter {
                msg: format!("Unknown envelope mode: {}", s),
            }),
        }
    }
}

/// Frequency-domain multiplier turning a spectrum into an analytic signal:
/// DC and Nyquist kept, positive frequencies doubled, negative ones dropped.
pub fn hilbert_mask(len: usize) -> Vec<f64> {
    let mut h = vec![0.0; len];
    if len == 0 {
        return h;
    }
    h[0] = 1.0;
    if len >= 2 {
        h[1..len / 2].fill(2.0);
        h[len / 2] = 1.0;
    }
    h
}

/// Envelope of a filtered capture. No window is applied before the FFT.
pub fn hilbert(input: &ScanBuffer, mode: EnvelopeMode) -> Result<ScanBuffer> {
    let size = input.len();
    let mut fft = FftProcessor::new(FftConfig::new(size, input.sample_rate())?)?;

    // The mask is zero above Nyquist, so the half spectrum is all we need
    let half = fft.forward_real(input.data())?;
    let mask = hilbert_mask(size);
    let mut spectrum = vec![Complex::default(); size];
    for (bin, value) in half.iter().enumerate() {
        spectrum[bin] = *value * mask[bin];
    }

    let analytic = fft.inverse(&spectrum)?;
    let envelope = analytic
        .iter()
        .map(|c| match mode {
            EnvelopeMode::RealPart => c.real.abs(),
            EnvelopeMode::Magnitude => c.magnitude(),
        })
        .collect();

    ScanBuffer::from_data(envelope, input.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BUFFER_LENGTH;
    use crate::filter::{butterworth_filter, SamplingParameters};
    use std::f64::consts::PI;

    const FS: f64 = 100e6;

    fn tone(frequency: f64, amplitude: f64) -> ScanBuffer {
        let data = (0..BUFFER_LENGTH)
            .map(|n| amplitude * (2.0 * PI * frequency * n as f64 / FS).sin())
            .collect();
        ScanBuffer::from_data(data, FS).unwrap()
    }

    fn argmax(buffer: &ScanBuffer) -> usize {
        buffer
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0
    }

    #[test]
    fn test_mask_shape() {
        let h = hilbert_mask(8);
        assert_eq!(h, vec![1.0, 2.0, 2.0, 2.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(hilbert_mask(BUFFER_LENGTH).iter().sum::<f64>(), BUFFER_LENGTH as f64);
    }

    #[test]
    fn test_envelope_mode_parsing() {
        assert_eq!("real".parse::<EnvelopeMode>().unwrap(), EnvelopeMode::RealPart);
        assert_eq!("Magnitude".parse::<EnvelopeMode>().unwrap(), EnvelopeMode::Magnitude);
        assert!("peak".parse::<EnvelopeMode>().is_err());
        assert_eq!(EnvelopeMode::default(), EnvelopeMode::RealPart);
    }

    #[test]
    fn test_magnitude_of_passband_tone_is_flat() {
        for frequency in [3e6, 4e6, 4.5e6] {
            let filtered = butterworth_filter(&tone(frequency, 1000.0), &SamplingParameters::default())
                .unwrap();
            let envelope = hilbert(&filtered, EnvelopeMode::Magnitude).unwrap();

            let middle = &envelope.data()[BUFFER_LENGTH / 10..BUFFER_LENGTH * 9 / 10];
            let mean = middle.iter().sum::<f64>() / middle.len() as f64;
            assert!(mean > 500.0);
            for v in middle {
                assert!((v - mean).abs() / mean < 0.1, "{} vs mean {}", v, mean);
            }
        }
    }

    #[test]
    fn test_real_part_is_the_rectified_input() {
        let input = tone(4e6, 1000.0);
        let envelope = hilbert(&input, EnvelopeMode::RealPart).unwrap();
        for (e, x) in envelope.iter().zip(input.iter()) {
            assert!((e - x.abs()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_filtered_impulse_envelope_peaks_near_impulse() {
        let mut data = vec![0.0; BUFFER_LENGTH];
        data[1024] = 15000.0;
        let impulse = ScanBuffer::from_data(data, FS).unwrap();
        let filtered = butterworth_filter(&impulse, &SamplingParameters::default()).unwrap();

        for mode in [EnvelopeMode::RealPart, EnvelopeMode::Magnitude] {
            let envelope = hilbert(&filtered, mode).unwrap();
            let peak = argmax(&envelope);
            assert!((1024..1100).contains(&peak), "{:?} peak at {}", mode, peak);
        }
    }
}
