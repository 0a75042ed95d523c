//! Synthetic two-echo captures for calibration and demos

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;
use std::path::PathBuf;

use umit_core::prelude::*;

use crate::common::{write_json, write_wav_points, CaptureFormat};

/// Mid-scale level the acquisition board idles at
const BASELINE: f64 = 10000.0;
/// Width (standard deviation) of an echo burst
const BURST_SIGMA_US: f64 = 0.25;
/// Second echo amplitude relative to the first
const SECOND_ECHO_RATIO: f64 = 0.6;

/// Synthetic capture configuration
#[derive(Debug, Clone, Parser)]
#[command(about = "Generate a synthetic two-echo capture")]
pub struct SynthConfig {
    /// Output file (.json measure record or .wav capture)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Wall thickness in mm
    #[arg(long, default_value = "10")]
    pub thickness_mm: f64,

    /// Sound velocity in the material, m/s
    #[arg(long, default_value = "5900")]
    pub prop_speed: f64,

    /// Arrival of the first echo in µs
    #[arg(long, default_value = "4")]
    pub first_echo_us: f64,

    /// First echo amplitude
    #[arg(long, default_value = "8000")]
    pub amplitude: f64,

    /// Uniform noise amplitude
    #[arg(long, default_value = "0")]
    pub noise: f64,

    /// Number of raw points in the capture
    #[arg(long, default_value = "2048")]
    pub samples: usize,

    /// Alert thickness in mm stored with the sensor
    #[arg(long)]
    pub alert: Option<f64>,

    /// Noise seed, random when absent
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("measure.json"),
            thickness_mm: 10.0,
            prop_speed: 5900.0,
            first_echo_us: 4.0,
            amplitude: 8000.0,
            noise: 0.0,
            samples: BUFFER_LENGTH,
            alert: None,
            seed: None,
        }
    }
}

/// Build a measure record holding a front-wall and a back-wall echo.
///
/// Gates are centred on both echoes and never overlap.
pub fn synthesize(config: &SynthConfig, sampling: &SamplingParameters) -> Result<MeasureRecord> {
    if config.samples == 0 {
        anyhow::bail!("Capture must have at least one point");
    }
    if !(config.amplitude > 0.0 && config.amplitude + config.noise < BASELINE) {
        anyhow::bail!(
            "Amplitude {} with noise {} does not fit the board range",
            config.amplitude,
            config.noise
        );
    }
    if !(config.thickness_mm > 0.0 && config.prop_speed > 0.0) {
        anyhow::bail!("Thickness and propagation speed must be positive");
    }

    let fs = sampling.sampling_frequency_hz;
    let total_us = BUFFER_LENGTH as f64 / sampling.sampling_frequency_mhz();
    let tof_us = 2.0 * config.thickness_mm / 1000.0 / config.prop_speed * 1e6;

    // echo centres sit on the processed sample grid
    let first_us = (config.first_echo_us * fs / 1e6).round() / fs * 1e6;
    let second_us = ((config.first_echo_us + tof_us) * fs / 1e6).round() / fs * 1e6;
    let half_gate_us = (tof_us / 2.0).min(1.0);
    if first_us - half_gate_us < 0.0 || second_us + half_gate_us > total_us {
        anyhow::bail!(
            "Echoes at {:.2} and {:.2} µs do not fit a {:.2} µs capture",
            first_us,
            second_us,
            total_us
        );
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let point_us = total_us / config.samples as f64;
    let points = (0..config.samples)
        .map(|i| {
            let t_us = i as f64 * point_us;
            let mut value = BASELINE
                + burst(t_us - first_us, config.amplitude, sampling.center_frequency_hz)
                + burst(
                    t_us - second_us,
                    config.amplitude * SECOND_ECHO_RATIO,
                    sampling.center_frequency_hz,
                );
            if config.noise > 0.0 {
                value += rng.gen_range(-config.noise..config.noise);
            }
            value.round().clamp(1.0, MAX_VALUE)
        })
        .collect();

    tracing::info!(
        "Synthesized {} points: echoes at {:.3} and {:.3} µs",
        config.samples,
        first_us,
        second_us
    );

    let mut record = MeasureRecord::new(
        points,
        GateConfig::new(first_us - half_gate_us, 2.0 * half_gate_us, 50.0),
        GateConfig::new(second_us - half_gate_us, 2.0 * half_gate_us, 30.0),
    );
    record.thickness = Some(config.thickness_mm);
    record.measure_date = Some(Utc::now());
    record.sensor = Some(SensorInfo {
        name: Some("synthetic".to_string()),
        frequency: Some(sampling.center_frequency_hz),
        prop_speed: Some(config.prop_speed),
        alert: config.alert,
    });
    Ok(record)
}

// Gaussian-windowed tone burst centred on t = 0
fn burst(t_us: f64, amplitude: f64, frequency_hz: f64) -> f64 {
    let t = t_us * 1e-6;
    let sigma = BURST_SIGMA_US * 1e-6;
    amplitude * (-0.5 * (t / sigma).powi(2)).exp() * (2.0 * PI * frequency_hz * t).sin()
}

/// Synthesize and write the capture in the format of its extension
pub fn run(config: &SynthConfig, sampling: &SamplingParameters) -> Result<MeasureRecord> {
    let record = synthesize(config, sampling)?;
    match CaptureFormat::from_path(&config.output) {
        CaptureFormat::Json => write_json(&record, &config.output)?,
        CaptureFormat::Wav => write_wav_points(&record.points, &config.output, sampling.sampling_frequency_hz)?,
    }
    Ok(record)
}
