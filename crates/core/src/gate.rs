//! Measurement gates and echo peak location

use crate::buffer::Envelope;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Operator-defined measurement window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Gate start, microseconds from the beginning of the capture
    pub start_us: f64,
    /// Gate width in microseconds
    pub width_us: f64,
    /// Threshold line height, percent of the plot height
    pub threshold_percent: f64,
}

impl GateConfig {
    pub fn new(start_us: f64, width_us: f64, threshold_percent: f64) -> Self {
        Self {
            start_us,
            width_us,
            threshold_percent,
        }
    }

    /// Sample index range covered by the gate in a buffer of `len`
    /// samples spanning `total_us`. `None` when the gate covers no sample.
    pub fn index_range(&self, len: usize, total_us: f64) -> Option<Range<usize>> {
        if len == 0 || !total_us.is_finite() || total_us <= 0.0 {
            return None;
        }

        let start = to_index(self.start_us / total_us * len as f64, len)?;
        let end = to_index((self.start_us + self.width_us) / total_us * len as f64, len)?;

        (start < end).then_some(start..end)
    }
}

fn to_index(position: f64, len: usize) -> Option<usize> {
    if !position.is_finite() {
        return None;
    }
    Some((position.trunc().max(0.0) as usize).min(len))
}

/// Peak positions found in gates A and B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakResult {
    pub peak_a: Option<usize>,
    pub peak_b: Option<usize>,
}

impl PeakResult {
    /// Both peaks, when both gates produced one
    pub fn both(&self) -> Option<(usize, usize)> {
        Some((self.peak_a?, self.peak_b?))
    }
}

/// Position of the first maximum; later equal values do not win
pub fn index_of_max<T: PartialOrd + Copy>(values: &[T]) -> Option<usize> {
    let (first, rest) = values.split_first()?;
    let mut max = *first;
    let mut id = 0;
    for (i, &v) in rest.iter().enumerate() {
        if v > max {
            max = v;
            id = i + 1;
        }
    }
    Some(id)
}

/// Absolute index of the highest point inside the gate
pub fn gate_peak<T: PartialOrd + Copy>(points: &[T], total_us: f64, gate: &GateConfig) -> Option<usize> {
    let Some(range) = gate.index_range(points.len(), total_us) else {
        debug!("Gate {:?} covers no sample of {} points", gate, points.len());
        return None;
    };
    let start = range.start;
    index_of_max(&points[range]).map(|local| start + local)
}

/// Locate the peaks of both gates on an A-scan curve
pub fn analyze_gates(envelope: &Envelope, gate_a: &GateConfig, gate_b: &GateConfig) -> PeakResult {
    let total_us = envelope.duration_us();
    PeakResult {
        peak_a: gate_peak(envelope.data(), total_us, gate_a),
        peak_b: gate_peak(envelope.data(), total_us, gate_b),
    }
}

/// Vertical pixel position of a gate threshold line on a plot of
/// `height` pixels with a bottom margin of `offset_y`
pub fn threshold_offset(height: f64, offset_y: f64, threshold_percent: f64) -> f64 {
    height - offset_y - (threshold_percent * height) / 100.0
}
