//! Wall thickness from the echo delay between gates A and B

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Whether a thickness is above the sensor alert level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThicknessStatus {
    Ok,
    Alert,
}

/// Delay between two peak indices, in microseconds
pub fn time_of_flight_us(peak_a: usize, peak_b: usize, sampling_frequency_hz: f64) -> Result<f64> {
    if !sampling_frequency_hz.is_finite() || sampling_frequency_hz <= 0.0 {
        return Err(CoreError::InvalidSampleRate {
            rate: sampling_frequency_hz,
        });
    }

    Ok(peak_a.abs_diff(peak_b) as f64 / sampling_frequency_hz * 1e6)
}

/// Pulse-echo thickness in mm: the wave crosses the wall twice
pub fn thickness_mm(time_of_flight_us: f64, prop_speed_mps: f64) -> Result<f64> {
    if !prop_speed_mps.is_finite() || prop_speed_mps <= 0.0 {
        return Err(CoreError::InvalidParameter {
            msg: format!("Invalid propagation speed: {}", prop_speed_mps),
        });
    }

    Ok(prop_speed_mps * time_of_flight_us * 1e-6 / 2.0 * 1000.0)
}

/// Alert when the wall got thinner than the alert level
pub fn evaluate(thickness_mm: f64, alert_mm: f64) -> ThicknessStatus {
    if thickness_mm < alert_mm {
        ThicknessStatus::Alert
    } else {
        ThicknessStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_flight() {
        assert!((time_of_flight_us(100, 440, 100e6).unwrap() - 3.4).abs() < 1e-12);
        // order of the gates does not matter
        assert_eq!(
            time_of_flight_us(440, 100, 100e6).unwrap(),
            time_of_flight_us(100, 440, 100e6).unwrap()
        );
        assert!(time_of_flight_us(1, 2, 0.0).is_err());
    }

    #[test]
    fn test_steel_thickness() {
        let thickness = thickness_mm(3.4, 5900.0).unwrap();
        assert!((thickness - 10.03).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_speed() {
        assert!(thickness_mm(3.4, 0.0).is_err());
        assert!(thickness_mm(3.4, f64::NAN).is_err());
    }

    #[test]
    fn test_alert_level() {
        assert_eq!(evaluate(7.9, 8.0), ThicknessStatus::Alert);
        assert_eq!(evaluate(8.0, 8.0), ThicknessStatus::Ok);
        assert_eq!(evaluate(12.0, 8.0), ThicknessStatus::Ok);
    }
}
