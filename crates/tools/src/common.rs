//! Common utilities: capture files, configuration files and logging

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capture file format detection and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    /// Backend measure record
    Json,
    /// Mono integer WAV holding only the raw points
    Wav,
}

impl CaptureFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("wav") => CaptureFormat::Wav,
            _ => CaptureFormat::Json, // Default
        }
    }

    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            CaptureFormat::Json => "json",
            CaptureFormat::Wav => "wav",
        }
    }
}

/// Initialize logging: WARN by default, INFO when verbose, DEBUG when debugging
pub fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    let log_level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Load configuration from file
pub fn load_config<T: for<'a> Deserialize<'a>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    // Try JSON first, then TOML
    if let Ok(config) = serde_json::from_str(&content) {
        return Ok(config);
    }

    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("Failed to parse config file {:?}: {}", path, e),
    }
}

/// Save configuration to file
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = if path.extension().and_then(|s| s.to_str()) == Some("json") {
        serde_json::to_string_pretty(config)?
    } else {
        toml::to_string_pretty(config)?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(())
}

/// Read a JSON document
pub fn read_json<T: for<'a> Deserialize<'a>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

/// Write a JSON document
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("Wrote {:?}", path);
    Ok(())
}

/// Read raw points from a WAV capture
pub fn read_wav_points(path: &Path) -> Result<Vec<f64>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {:?}", path))?;

    let spec = reader.spec();
    if spec.channels != 1 {
        anyhow::bail!("Expected a mono capture, {:?} has {} channels", path, spec.channels);
    }

    let points: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<Vec<f64>, _>>(),
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<Vec<f64>, _>>(),
    }
    .with_context(|| "Failed to read capture samples")?;

    tracing::info!("Read {} points from {:?}", points.len(), path);
    Ok(points)
}

/// Write raw points as a 16-bit mono WAV capture
pub fn write_wav_points(points: &[f64], path: &Path, sample_rate: f64) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

    for &point in points {
        writer.write_sample(point.round().clamp(0.0, f64::from(i16::MAX)) as i16)?;
    }

    writer.finalize()?;
    tracing::info!("Wrote {} points to {:?}", points.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_capture_format_detection() {
        assert_eq!(CaptureFormat::from_path(&PathBuf::from("m.wav")), CaptureFormat::Wav);
        assert_eq!(CaptureFormat::from_path(&PathBuf::from("m.json")), CaptureFormat::Json);
        assert_eq!(CaptureFormat::from_path(&PathBuf::from("measure")), CaptureFormat::Json);
        assert_eq!(CaptureFormat::Wav.extension(), "wav");
    }

    #[test]
    fn test_wav_points_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.wav");
        let points: Vec<f64> = (0..300).map(|i| (i * 50) as f64).collect();

        write_wav_points(&points, &path, 100e6).unwrap();
        assert_eq!(read_wav_points(&path).unwrap(), points);
    }

    #[test]
    fn test_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(read_json::<serde_json::Value>(&missing).is_err());
        assert!(read_wav_points(&dir.path().join("missing.wav")).is_err());

        let garbage = dir.path().join("garbage.toml");
        std::fs::write(&garbage, "not = [valid").unwrap();
        assert!(load_config::<serde_json::Value>(&garbage).is_err());
    }
}
