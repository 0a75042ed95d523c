//! Drawing geometry of an analysed capture

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use umit_core::prelude::*;

use crate::analyze::{AnalyzeConfig, MeasureAnalyzer};
use crate::common::write_json;
use crate::config::UmitConfig;

/// Plot configuration
#[derive(Debug, Clone, Default, Parser)]
#[command(about = "Lay out the A-scan curve, time axis and gates of a capture")]
pub struct PlotConfig {
    /// Input capture: measure record (.json) or raw points (.wav)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file for the geometry (JSON), stdout when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<f64>,

    /// Envelope mode: real (legacy) or magnitude
    #[arg(long)]
    pub mode: Option<String>,
}

/// Analyse the capture and compute what a renderer needs to draw it
pub fn run_plot(config: &PlotConfig, settings: &UmitConfig) -> Result<PlotGeometry> {
    let analyzer = MeasureAnalyzer::new(
        AnalyzeConfig {
            input: config.input.clone(),
            mode: config.mode.clone(),
            ..AnalyzeConfig::default()
        },
        settings.clone(),
    )?;
    let (record, analysis) = analyzer.analyze_record()?;

    let layout = CanvasLayout::new(
        config.width.unwrap_or(settings.canvas.width),
        config.height.unwrap_or(settings.canvas.height),
    )?;
    let gates = [
        (record.gate_a(), analysis.peaks.peak_a),
        (record.gate_b(), analysis.peaks.peak_b),
    ];
    let geometry = layout.geometry(&analysis.envelope, analysis.total_us, &gates);
    tracing::debug!(
        "Laid out {} curve points on a {}x{} canvas",
        geometry.curve.len(),
        layout.width,
        layout.height
    );

    match &config.output {
        Some(output) => write_json(&geometry, output)?,
        None => println!("{}", serde_json::to_string_pretty(&geometry)?),
    }
    Ok(geometry)
}
