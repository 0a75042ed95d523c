//! Capture normalisation: resampling onto the fixed buffer and gap repair

use crate::buffer::{ScanBuffer, BUFFER_LENGTH, MAX_VALUE};
use crate::{CoreError, Result};
use tracing::debug;

/// Outcome of a cleanup pass
#[derive(Debug, Clone)]
pub struct CleanupReport {
    pub buffer: ScanBuffer,
    /// Number of destination samples replaced by a neighbour average
    pub repaired: usize,
}

/// Normalise a raw capture of any length onto [`BUFFER_LENGTH`] samples.
///
/// Source sample `i` lands on `floor(i * BUFFER_LENGTH / len)`; when the
/// source is longer than the buffer the last write wins. Slots that are
/// still 0 or exceed [`MAX_VALUE`] are then repaired in a single
/// left-to-right pass. Index 0 is never repaired.
pub fn cleanup(raw: &[f64], sample_rate: f64) -> Result<ScanBuffer> {
    cleanup_with_report(raw, sample_rate).map(|report| report.buffer)
}

/// Same as [`cleanup`], also reporting how many samples were repaired
pub fn cleanup_with_report(raw: &[f64], sample_rate: f64) -> Result<CleanupReport> {
    if raw.is_empty() {
        return Err(CoreError::EmptyInput);
    }

    if let Some((index, &value)) = raw
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(CoreError::InvalidSample { index, value });
    }

    let mut clean = vec![0.0; BUFFER_LENGTH];
    let step = BUFFER_LENGTH as f64 / raw.len() as f64;
    debug!("Resampling {} samples, step {}", raw.len(), step);

    for (i, &sample) in raw.iter().enumerate() {
        let id = ((i as f64 * step).floor() as usize).min(BUFFER_LENGTH - 1);
        clean[id] = sample;
    }

    let mut repaired = 0;
    for i in 1..BUFFER_LENGTH {
        if needs_repair(clean[i]) {
            let left = clean[i - 1];
            // A missing (last slot) or zero right neighbour falls back to the left one
            let right = match clean.get(i + 1) {
                Some(&v) if v != 0.0 => v,
                _ => left,
            };
            clean[i] = round_half_up((left + right) / 2.0);
            repaired += 1;
        }
    }

    debug!("Cleanup repaired {} samples", repaired);

    Ok(CleanupReport {
        buffer: ScanBuffer::from_data(clean, sample_rate)?,
        repaired,
    })
}

fn needs_repair(value: f64) -> bool {
    value > MAX_VALUE || value == 0.0
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    const FS: f64 = 100e6;

    #[test]
    fn test_exact_length_is_untouched() {
        let raw: Vec<f64> = (0..BUFFER_LENGTH).map(|i| (i % 500 + 1) as f64).collect();
        let report = cleanup_with_report(&raw, FS).unwrap();
        assert_eq!(report.buffer.data(), raw.as_slice());
        assert_eq!(report.repaired, 0);
    }

    #[test]
    fn test_oversampled_capture_keeps_last_write() {
        // 4096 samples: source 2k and 2k+1 both land on k, 2k+1 wins
        let raw: Vec<f64> = (0..2 * BUFFER_LENGTH).map(|i| (i + 1) as f64).collect();
        let clean = cleanup(&raw, FS).unwrap();
        assert_eq!(clean.len(), BUFFER_LENGTH);
        for k in 0..BUFFER_LENGTH {
            assert_eq!(clean[k], (2 * k + 2) as f64);
        }
    }

    #[test]
    fn test_undersampled_capture_is_interpolated() {
        // 1024 samples: every odd slot is a gap filled from its neighbours
        let raw: Vec<f64> = (0..BUFFER_LENGTH / 2).map(|i| (i * 10 + 100) as f64).collect();
        let report = cleanup_with_report(&raw, FS).unwrap();
        let clean = report.buffer;
        assert_eq!(clean[0], 100.0);
        assert_eq!(clean[1], 105.0);
        assert_eq!(clean[2], 110.0);
        assert_eq!(clean[3], 115.0);
        // last slot has no right neighbour and copies the left one
        assert_eq!(clean[BUFFER_LENGTH - 1], clean[BUFFER_LENGTH - 2]);
        assert_eq!(report.repaired, BUFFER_LENGTH / 2);
    }

    #[test]
    fn test_spike_is_replaced_by_neighbour_average() {
        let mut raw = vec![1000.0; BUFFER_LENGTH];
        raw[10] = 30000.0;
        raw[11] = 1001.0;
        let clean = cleanup(&raw, FS).unwrap();
        assert_eq!(clean[10], 1001.0); // round(1000.5)
        assert_eq!(clean[11], 1001.0);
    }

    #[test]
    fn test_zero_right_neighbour_falls_back_to_left() {
        let mut raw = vec![500.0; BUFFER_LENGTH];
        raw[20] = 0.0;
        raw[21] = 0.0;
        let clean = cleanup(&raw, FS).unwrap();
        assert_eq!(clean[20], 500.0);
        assert_eq!(clean[21], 500.0);
    }

    #[test]
    fn test_first_slot_is_never_repaired() {
        let mut raw = vec![700.0; BUFFER_LENGTH];
        raw[0] = 0.0;
        let clean = cleanup(&raw, FS).unwrap();
        assert_eq!(clean[0], 0.0);
        // slot 1 is fine and stays as captured
        assert_eq!(clean[1], 700.0);
    }

    #[test]
    fn test_single_sample_fills_buffer() {
        let clean = cleanup(&[1234.0], FS).unwrap();
        assert!(clean.iter().all(|&v| v == 1234.0));
    }

    #[test]
    fn test_empty_capture_is_rejected() {
        assert_eq!(cleanup(&[], FS).unwrap_err(), CoreError::EmptyInput);
    }

    #[test]
    fn test_malformed_samples_are_rejected() {
        let err = cleanup(&[1.0, f64::NAN, 3.0], FS).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSample { index: 1, .. }));

        let err = cleanup(&[1.0, 2.0, -3.0], FS).unwrap_err();
        assert_eq!(err, CoreError::InvalidSample { index: 2, value: -3.0 });
    }

    #[quickcheck]
    fn prop_output_is_always_full_length(raw: Vec<u16>) -> TestResult {
        if raw.is_empty() {
            return TestResult::discard();
        }
        let raw: Vec<f64> = raw.into_iter().map(f64::from).collect();
        match cleanup(&raw, FS) {
            Ok(clean) => TestResult::from_bool(clean.len() == BUFFER_LENGTH),
            Err(_) => TestResult::failed(),
        }
    }

    #[quickcheck]
    fn prop_in_range_captures_have_no_gaps(raw: Vec<u16>) -> TestResult {
        // Only values in 1..=MAX_VALUE: no cascading repair failures possible
        let raw: Vec<f64> = raw
            .into_iter()
            .map(|v| f64::from(v % 20000 + 1))
            .collect();
        if raw.is_empty() {
            return TestResult::discard();
        }
        let clean = match cleanup(&raw, FS) {
            Ok(clean) => clean,
            Err(_) => return TestResult::failed(),
        };
        TestResult::from_bool(
            clean
                .iter()
                .skip(1)
                .all(|&v| v > 0.0 && v <= MAX_VALUE),
        )
    }
}
