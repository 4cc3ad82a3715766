//! Central Configuration Constants
//!
//! Single source of truth for engine defaults. To change the default
//! severity-vs-frequency comparison, only edit this file.

/// Default pairwise comparison value: severity is 3x as important as
/// frequency.
pub const DEFAULT_PAIRWISE_VALUE: f64 = 3.0;

/// Tolerance for weight-sum checks.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Pearson coefficient above which the sensor array counts as calibrated.
pub const SENSOR_LINEARITY_THRESHOLD: f64 = 0.9;

/// Absolute Pearson coefficient above which a tenure trend is significant.
pub const TENURE_SIGNIFICANCE_BAND: f64 = 0.3;

/// Concentration (ppm) that forces a CRITICAL tier regardless of score.
pub const DEFAULT_SEVERITY_OVERRIDE_PPM: f64 = 500.0;

/// Power iteration convergence bound.
pub const EIGEN_CONVERGENCE: f64 = 1e-12;

/// Power iteration cap.
pub const EIGEN_MAX_ITERATIONS: usize = 500;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "BreathSense";

/// Get the pairwise comparison value from the environment or use the default
pub fn get_pairwise_value() -> f64 {
    std::env::var("BREATHSENSE_PAIRWISE_VALUE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PAIRWISE_VALUE)
}

/// Get the hard severity override (ppm) from the environment or use the default
pub fn get_severity_override_ppm() -> f64 {
    std::env::var("BREATHSENSE_SEVERITY_OVERRIDE_PPM")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEVERITY_OVERRIDE_PPM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_PAIRWISE_VALUE, 3.0);
        assert!(SENSOR_LINEARITY_THRESHOLD > 0.0 && SENSOR_LINEARITY_THRESHOLD < 1.0);
    }
}
