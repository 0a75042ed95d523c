//! Configuration management for Umit tools

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use umit_core::prelude::*;

use crate::common::{load_config, save_config};

/// Settings shared by all commands; command-line flags take precedence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UmitConfig {
    pub envelope_mode: EnvelopeMode,
    pub sampling: SamplingParameters,
    /// Gates used for captures that carry none (WAV files)
    pub gate_a: GateConfig,
    pub gate_b: GateConfig,
    pub canvas: CanvasLayout,
}

impl Default for UmitConfig {
    fn default() -> Self {
        Self {
            envelope_mode: EnvelopeMode::default(),
            sampling: SamplingParameters::default(),
            gate_a: GateConfig::new(2.0, 4.0, 50.0),
            gate_b: GateConfig::new(8.0, 6.0, 30.0),
            canvas: CanvasLayout::default(),
        }
    }
}

impl UmitConfig {
    /// Load from `path`, or use defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = load_config(path)?;
        tracing::debug!("Loaded configuration from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Save configuration, TOML unless the extension says JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        save_config(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> UmitConfig {
        UmitConfig {
            envelope_mode: EnvelopeMode::Magnitude,
            gate_a: GateConfig::new(1.5, 2.5, 45.0),
            ..UmitConfig::default()
        }
    }

    #[test]
    fn test_config_serialization() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["umit.toml", "umit.json"] {
            let path = dir.path().join(name);
            custom().save_to_file(&path).unwrap();
            assert_eq!(UmitConfig::from_file(&path).unwrap(), custom());
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "envelope_mode = \"magnitude\"\n\n[sampling]\ncenter_frequency_hz = 5000000.0\n").unwrap();

        let config = UmitConfig::from_file(&path).unwrap();
        assert_eq!(config.envelope_mode, EnvelopeMode::Magnitude);
        assert_eq!(config.sampling, SamplingParameters::default());
        assert_eq!(config.gate_b, UmitConfig::default().gate_b);
    }

    #[test]
    fn test_missing_path_gives_defaults() {
        assert_eq!(UmitConfig::load(None).unwrap(), UmitConfig::default());
    }
}
