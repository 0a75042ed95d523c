//! End-to-end A-scan computation

use crate::buffer::{Envelope, ScanBuffer};
use crate::cleanup::cleanup_with_report;
use crate::filter::{butterworth_filter, coefficient_table, SamplingParameters};
use crate::gate::{analyze_gates, GateConfig, PeakResult};
use crate::hilbert::{hilbert, EnvelopeMode};
use crate::measure::MeasureRecord;
use crate::thickness::{self, ThicknessStatus};
use crate::Result;
use serde::Serialize;
use tracing::{debug, info};

/// Cleanup, filter and envelope stages with a fixed configuration.
///
/// Holds no per-capture state; one pipeline can serve any number of
/// captures, from any number of threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AScanPipeline {
    sampling: SamplingParameters,
    mode: EnvelopeMode,
}

impl Default for AScanPipeline {
    fn default() -> Self {
        Self {
            sampling: SamplingParameters::default(),
            mode: EnvelopeMode::default(),
        }
    }
}

impl AScanPipeline {
    /// Fails when no filter coefficients exist for `sampling`
    pub fn new(sampling: SamplingParameters, mode: EnvelopeMode) -> Result<Self> {
        coefficient_table(&sampling)?;
        Ok(Self { sampling, mode })
    }

    pub fn sampling(&self) -> &SamplingParameters {
        &self.sampling
    }

    pub fn mode(&self) -> EnvelopeMode {
        self.mode
    }

    /// Turn a raw capture into the integer A-scan curve
    pub fn compute(&self, raw: &[f64]) -> Result<Envelope> {
        compute_curve(raw, &self.sampling, self.mode)
    }

    /// Peaks of gates A and B on a computed curve
    pub fn peaks(&self, envelope: &Envelope, gate_a: &GateConfig, gate_b: &GateConfig) -> PeakResult {
        analyze_gates(envelope, gate_a, gate_b)
    }

    /// Full analysis of a backend measure: curve, peaks and, when the
    /// sensor metadata allows it, thickness and alert status
    pub fn analyze(&self, record: &MeasureRecord) -> Result<MeasureAnalysis> {
        let sampling = record.sampling(self.sampling);
        let envelope = compute_curve(&record.points, &sampling, self.mode)?;
        let peaks = analyze_gates(&envelope, &record.gate_a(), &record.gate_b());

        let time_of_flight_us = peaks
            .both()
            .map(|(a, b)| thickness::time_of_flight_us(a, b, sampling.sampling_frequency_hz))
            .transpose()?;

        let thickness_mm = match (time_of_flight_us, record.prop_speed()) {
            (Some(tof), Some(speed)) => Some(thickness::thickness_mm(tof, speed)?),
            _ => None,
        };

        let status = thickness_mm
            .zip(record.alert_mm())
            .map(|(thickness, alert)| thickness::evaluate(thickness, alert));

        info!(
            "Measure analysed: peaks {:?}/{:?}, thickness {:?} mm",
            peaks.peak_a, peaks.peak_b, thickness_mm
        );

        Ok(MeasureAnalysis {
            total_us: envelope.duration_us(),
            envelope: envelope.into_inner(),
            peaks,
            time_of_flight_us,
            thickness_mm,
            status,
            stored_thickness_mm: record.thickness,
        })
    }
}

/// Result of [`AScanPipeline::analyze`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureAnalysis {
    pub envelope: Vec<u32>,
    pub total_us: f64,
    pub peaks: PeakResult,
    pub time_of_flight_us: Option<f64>,
    pub thickness_mm: Option<f64>,
    pub status: Option<ThicknessStatus>,
    pub stored_thickness_mm: Option<f64>,
}

/// Cleanup, band-pass filter and envelope of a raw capture, truncated to
/// integers
pub fn compute_curve(raw: &[f64], sampling: &SamplingParameters, mode: EnvelopeMode) -> Result<Envelope> {
    debug!("Computing curve from {} samples ({:?})", raw.len(), mode);

    let report = cleanup_with_report(raw, sampling.sampling_frequency_hz)?;
    let filtered = butterworth_filter(&report.buffer, sampling)?;
    let envelope = hilbert(&filtered, mode)?;

    to_integers(&envelope)
}

// Truncation toward zero, saturating; NaN becomes 0
fn to_integers(buffer: &ScanBuffer) -> Result<Envelope> {
    let data = buffer.iter().map(|&v| v as u32).collect();
    Envelope::from_data(data, buffer.sample_rate())
}
