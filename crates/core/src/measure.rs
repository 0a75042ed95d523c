//! Measure records as delivered by the backend

use crate::filter::SamplingParameters;
use crate::gate::GateConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sensor metadata attached to a measure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// Transducer center frequency in Hz
    #[serde(default, deserialize_with = "number_or_string")]
    pub frequency: Option<f64>,
    /// Sound velocity in the inspected material, m/s
    #[serde(default)]
    pub prop_speed: Option<f64>,
    /// Minimum acceptable wall thickness, mm
    #[serde(default)]
    pub alert: Option<f64>,
}

/// One ultrasonic capture with its gate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureRecord {
    pub points: Vec<f64>,
    pub start_a: f64,
    pub width_a: f64,
    pub threshold_a: f64,
    pub start_b: f64,
    pub width_b: f64,
    pub threshold_b: f64,
    /// Thickness stored by the backend, mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<SensorInfo>,
}

impl MeasureRecord {
    /// Record with the given points and gates, no metadata
    pub fn new(points: Vec<f64>, gate_a: GateConfig, gate_b: GateConfig) -> Self {
        Self {
            points,
            start_a: gate_a.start_us,
            width_a: gate_a.width_us,
            threshold_a: gate_a.threshold_percent,
            start_b: gate_b.start_us,
            width_b: gate_b.width_us,
            threshold_b: gate_b.threshold_percent,
            thickness: None,
            measure_date: None,
            sensor: None,
        }
    }

    pub fn gate_a(&self) -> GateConfig {
        GateConfig::new(self.start_a, self.width_a, self.threshold_a)
    }

    pub fn gate_b(&self) -> GateConfig {
        GateConfig::new(self.start_b, self.width_b, self.threshold_b)
    }

    pub fn set_gate_a(&mut self, gate: GateConfig) {
        self.start_a = gate.start_us;
        self.width_a = gate.width_us;
        self.threshold_a = gate.threshold_percent;
    }

    pub fn set_gate_b(&mut self, gate: GateConfig) {
        self.start_b = gate.start_us;
        self.width_b = gate.width_us;
        self.threshold_b = gate.threshold_percent;
    }

    /// Sampling setup for this measure: the sensor's center frequency
    /// when known, everything else from `defaults`
    pub fn sampling(&self, defaults: SamplingParameters) -> SamplingParameters {
        match self.sensor.as_ref().and_then(|s| s.frequency) {
            Some(center_frequency_hz) => SamplingParameters {
                center_frequency_hz,
                ..defaults
            },
            None => defaults,
        }
    }

    pub fn prop_speed(&self) -> Option<f64> {
        self.sensor.as_ref().and_then(|s| s.prop_speed)
    }

    pub fn alert_mm(&self) -> Option<f64> {
        self.sensor.as_ref().and_then(|s| s.alert)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

// The backend exposes the sensor frequency as a decimal string
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(v)) => Ok(Some(v)),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
