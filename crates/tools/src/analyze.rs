//! A-scan analysis of capture files

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use umit_core::prelude::*;

use crate::common::{read_json, read_wav_points, write_json, CaptureFormat};
use crate::config::UmitConfig;

/// Analysis configuration
#[derive(Debug, Clone, Default, Parser)]
#[command(about = "Compute the A-scan curve, gate peaks and thickness of a capture")]
pub struct AnalyzeConfig {
    /// Input capture: measure record (.json) or raw points (.wav)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file for the analysis (JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Envelope mode: real (legacy) or magnitude
    #[arg(long)]
    pub mode: Option<String>,

    /// Gate A start in µs
    #[arg(long)]
    pub start_a: Option<f64>,

    /// Gate A width in µs
    #[arg(long)]
    pub width_a: Option<f64>,

    /// Gate A threshold in percent
    #[arg(long)]
    pub threshold_a: Option<f64>,

    /// Gate B start in µs
    #[arg(long)]
    pub start_b: Option<f64>,

    /// Gate B width in µs
    #[arg(long)]
    pub width_b: Option<f64>,

    /// Gate B threshold in percent
    #[arg(long)]
    pub threshold_b: Option<f64>,

    /// Sound velocity in the material, m/s
    #[arg(long)]
    pub prop_speed: Option<f64>,

    /// Alert thickness in mm
    #[arg(long)]
    pub alert: Option<f64>,
}

/// Loads captures, applies overrides and runs the pipeline
pub struct MeasureAnalyzer {
    config: AnalyzeConfig,
    settings: UmitConfig,
    pipeline: AScanPipeline,
}

impl MeasureAnalyzer {
    pub fn new(config: AnalyzeConfig, settings: UmitConfig) -> Result<Self> {
        let mode = match &config.mode {
            Some(mode) => mode.parse::<EnvelopeMode>()?,
            None => settings.envelope_mode,
        };
        let pipeline = AScanPipeline::new(settings.sampling, mode)?;

        Ok(Self {
            config,
            settings,
            pipeline,
        })
    }

    pub fn pipeline(&self) -> &AScanPipeline {
        &self.pipeline
    }

    /// Read the capture and apply command-line overrides
    pub fn load_record(&self) -> Result<MeasureRecord> {
        let input = &self.config.input;
        let mut record = match CaptureFormat::from_path(input) {
            CaptureFormat::Json => read_json::<MeasureRecord>(input)
                .with_context(|| format!("Invalid measure record: {:?}", input))?,
            CaptureFormat::Wav => MeasureRecord::new(
                read_wav_points(input)?,
                self.settings.gate_a,
                self.settings.gate_b,
            ),
        };

        let c = &self.config;
        record.set_gate_a(override_gate(record.gate_a(), c.start_a, c.width_a, c.threshold_a));
        record.set_gate_b(override_gate(record.gate_b(), c.start_b, c.width_b, c.threshold_b));

        if c.prop_speed.is_some() || c.alert.is_some() {
            let sensor = record.sensor.get_or_insert_with(SensorInfo::default);
            sensor.prop_speed = c.prop_speed.or(sensor.prop_speed);
            sensor.alert = c.alert.or(sensor.alert);
        }

        Ok(record)
    }

    /// Analyse the capture, returning the record actually analysed
    pub fn analyze_record(&self) -> Result<(MeasureRecord, MeasureAnalysis)> {
        let record = self.load_record()?;
        tracing::info!("Analyzing {} points from {:?}", record.points.len(), self.config.input);

        let analysis = self.pipeline.analyze(&record)?;
        Ok((record, analysis))
    }

    /// Analyse and write the output file when one was requested
    pub fn run(&self) -> Result<MeasureAnalysis> {
        let (_, analysis) = self.analyze_record()?;
        if let Some(output) = &self.config.output {
            write_json(&analysis, output)?;
        }
        Ok(analysis)
    }
}

fn override_gate(gate: GateConfig, start: Option<f64>, width: Option<f64>, threshold: Option<f64>) -> GateConfig {
    GateConfig {
        start_us: start.unwrap_or(gate.start_us),
        width_us: width.unwrap_or(gate.width_us),
        threshold_percent: threshold.unwrap_or(gate.threshold_percent),
    }
}

/// Human readable summary of an analysis
pub fn summary(analysis: &MeasureAnalysis) -> String {
    let peak = |p: Option<usize>| match p {
        Some(index) => format!("sample {}", index),
        None => "none".to_string(),
    };

    let mut lines = vec![
        format!("Capture: {} samples, {:.2} µs", analysis.envelope.len(), analysis.total_us),
        format!("Peak A: {}", peak(analysis.peaks.peak_a)),
        format!("Peak B: {}", peak(analysis.peaks.peak_b)),
    ];
    if let Some(tof) = analysis.time_of_flight_us {
        lines.push(format!("Time of flight: {:.3} µs", tof));
    }
    if let Some(thickness) = analysis.thickness_mm {
        lines.push(format!("Thickness: {:.2} mm", thickness));
    }
    if let Some(stored) = analysis.stored_thickness_mm {
        lines.push(format!("Stored thickness: {:.2} mm", stored));
    }
    if let Some(status) = analysis.status {
        lines.push(format!("Status: {:?}", status));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::write_wav_points;
    use crate::synth::{synthesize, SynthConfig};

    fn synth_config(output: PathBuf) -> SynthConfig {
        SynthConfig {
            output,
            ..SynthConfig::default()
        }
    }

    #[test]
    fn test_analyze_json_measure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("measure.json");
        let output = dir.path().join("analysis.json");

        let record = synthesize(&synth_config(input.clone()), &SamplingParameters::default()).unwrap();
        write_json(&record, &input).unwrap();

        let config = AnalyzeConfig {
            input,
            output: Some(output.clone()),
            ..AnalyzeConfig::default()
        };
        let analysis = MeasureAnalyzer::new(config, UmitConfig::default()).unwrap().run().unwrap();

        let thickness = analysis.thickness_mm.unwrap();
        assert!((thickness - 10.0).abs() < 0.1, "{} mm", thickness);
        assert!(summary(&analysis).contains("Thickness: 10.0"));

        let written: serde_json::Value = read_json(&output).unwrap();
        assert_eq!(written["envelope"].as_array().unwrap().len(), BUFFER_LENGTH);
        assert!(written["peaks"]["peakA"].is_u64());
    }

    #[test]
    fn test_analyze_wav_capture_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("capture.wav");
        let record = synthesize(&synth_config(input.clone()), &SamplingParameters::default()).unwrap();
        write_wav_points(&record.points, &input, 100e6).unwrap();

        let config = AnalyzeConfig {
            input,
            mode: Some("magnitude".to_string()),
            start_a: Some(record.start_a),
            width_a: Some(record.width_a),
            start_b: Some(record.start_b),
            width_b: Some(record.width_b),
            prop_speed: Some(5900.0),
            alert: Some(8.0),
            ..AnalyzeConfig::default()
        };
        let analyzer = MeasureAnalyzer::new(config, UmitConfig::default()).unwrap();
        assert_eq!(analyzer.pipeline().mode(), EnvelopeMode::Magnitude);

        let (loaded, analysis) = analyzer.analyze_record().unwrap();
        assert_eq!(loaded.gate_a().start_us, record.start_a);
        assert_eq!(loaded.gate_a().threshold_percent, UmitConfig::default().gate_a.threshold_percent);
        assert!((analysis.thickness_mm.unwrap() - 10.0).abs() < 0.1);
        assert_eq!(analysis.status, Some(ThicknessStatus::Ok));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let config = AnalyzeConfig {
            mode: Some("peak-hold".to_string()),
            ..AnalyzeConfig::default()
        };
        assert!(MeasureAnalyzer::new(config, UmitConfig::default()).is_err());
    }

    #[test]
    fn test_malformed_record_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        std::fs::write(&input, r#"{"points": [1, 2, 3]}"#).unwrap();

        let config = AnalyzeConfig {
            input,
            ..AnalyzeConfig::default()
        };
        assert!(MeasureAnalyzer::new(config, UmitConfig::default()).unwrap().run().is_err());
    }
}
