//! Risk Classifier
//!
//! Deterministic, ordered predicate ladder over `(score, raw metrics)`.
//! First matching predicate wins, evaluated top-down:
//!
//! 1. max concentration at or above the hard override -> CRITICAL
//! 2. score >= critical band -> CRITICAL
//! 3. secondary: score >= lower critical band AND max concentration floor -> CRITICAL
//! 4. score >= high band -> HIGH
//! 5. secondary: score >= lower high band AND max concentration floor -> HIGH
//! 6. score >= medium band -> MEDIUM
//! 7. default -> LOW
//!
//! Holding raw metrics fixed below the override, a higher score never
//! yields a lower tier.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SEVERITY_OVERRIDE_PPM;
use crate::error::{EngineError, EngineResult};
use crate::metrics::extractor::SubjectMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }

    /// Label used on the exported dashboard surfaces.
    pub fn localized_label(&self) -> &'static str {
        match self {
            RiskTier::Low => "BAJO",
            RiskTier::Medium => "MEDIO",
            RiskTier::High => "ALTO",
            RiskTier::Critical => "CRÍTICO",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            RiskTier::Low => 0,
            RiskTier::Medium => 1,
            RiskTier::High => 2,
            RiskTier::Critical => 3,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lower score bands that apply only together with a raw max-concentration
/// floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryThresholds {
    pub critical_score: f64,
    pub high_score: f64,
    /// Raw max concentration (ppm) that must also hold.
    pub min_max_concentration: f64,
}

/// Tier ladder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Max concentration (ppm) that forces CRITICAL regardless of score.
    pub severity_override_ppm: Option<f64>,
    pub critical_score: f64,
    pub high_score: f64,
    pub medium_score: f64,
    pub secondary: Option<SecondaryThresholds>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            severity_override_ppm: Some(DEFAULT_SEVERITY_OVERRIDE_PPM),
            critical_score: 80.0,
            high_score: 60.0,
            medium_score: 40.0,
            secondary: None,
        }
    }
}

impl ClassifierConfig {
    /// Ladder with the combined score/raw-metric bands enabled.
    pub fn with_secondary() -> Self {
        Self {
            secondary: Some(SecondaryThresholds {
                critical_score: 75.0,
                high_score: 50.0,
                min_max_concentration: 300.0,
            }),
            ..Default::default()
        }
    }

    /// Reject band configurations that would break ladder monotonicity.
    pub fn validate(&self) -> EngineResult<()> {
        let bands = [self.critical_score, self.high_score, self.medium_score];
        if bands.iter().any(|b| !b.is_finite()) {
            return Err(EngineError::Configuration(
                "classifier score bands must be finite".to_string(),
            ));
        }
        if !(self.medium_score <= self.high_score && self.high_score <= self.critical_score) {
            return Err(EngineError::Configuration(
                "classifier score bands must be ordered medium <= high <= critical".to_string(),
            ));
        }
        if let Some(threshold) = self.severity_override_ppm {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(EngineError::Configuration(
                    "severity override must be a positive concentration".to_string(),
                ));
            }
        }
        if let Some(secondary) = &self.secondary {
            if secondary.critical_score > self.critical_score
                || secondary.high_score > self.high_score
                || secondary.high_score > secondary.critical_score
            {
                return Err(EngineError::Configuration(
                    "secondary score bands must not exceed their primary bands".to_string(),
                ));
            }
            if !secondary.min_max_concentration.is_finite()
                || secondary.min_max_concentration <= 0.0
            {
                return Err(EngineError::Configuration(
                    "secondary concentration floor must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn classify(&self, score: f64, metrics: &SubjectMetrics) -> RiskTier {
        if let Some(threshold) = self.severity_override_ppm {
            if metrics.max_concentration >= threshold {
                return RiskTier::Critical;
            }
        }
        if score >= self.critical_score {
            return RiskTier::Critical;
        }
        if let Some(secondary) = &self.secondary {
            if score >= secondary.critical_score
                && metrics.max_concentration >= secondary.min_max_concentration
            {
                return RiskTier::Critical;
            }
        }
        if score >= self.high_score {
            return RiskTier::High;
        }
        if let Some(secondary) = &self.secondary {
            if score >= secondary.high_score
                && metrics.max_concentration >= secondary.min_max_concentration
            {
                return RiskTier::High;
            }
        }
        if score >= self.medium_score {
            return RiskTier::Medium;
        }
        RiskTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn metrics(max: f64) -> SubjectMetrics {
        SubjectMetrics {
            external_id: "EMP001".to_string(),
            display_name: "Subject".to_string(),
            category: "Ops".to_string(),
            max_concentration: max,
            positive_count: 3,
            mean_concentration: max / 2.0,
            std_deviation: 1.0,
            sample_density: 0.5,
            first_sample: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            last_sample: Utc.with_ymd_and_hms(2025, 6, 5, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_score_bands() {
        let config = ClassifierConfig::default();
        let m = metrics(100.0);
        assert_eq!(config.classify(87.5, &m), RiskTier::Critical);
        assert_eq!(config.classify(80.0, &m), RiskTier::Critical);
        assert_eq!(config.classify(62.5, &m), RiskTier::High);
        assert_eq!(config.classify(45.0, &m), RiskTier::Medium);
        assert_eq!(config.classify(12.0, &m), RiskTier::Low);
    }

    #[test]
    fn test_severity_override_beats_score() {
        let config = ClassifierConfig::default();
        assert_eq!(config.classify(5.0, &metrics(500.0)), RiskTier::Critical);
        assert_eq!(config.classify(5.0, &metrics(499.9)), RiskTier::Low);
    }

    #[test]
    fn test_secondary_bands() {
        let config = ClassifierConfig::with_secondary();

        // High max concentration unlocks the lower bands
        assert_eq!(config.classify(76.0, &metrics(350.0)), RiskTier::Critical);
        assert_eq!(config.classify(55.0, &metrics(350.0)), RiskTier::High);

        // Without the raw-metric floor the primary bands apply
        assert_eq!(config.classify(76.0, &metrics(100.0)), RiskTier::High);
        assert_eq!(config.classify(55.0, &metrics(100.0)), RiskTier::Medium);
    }

    #[test]
    fn test_monotonic_in_score() {
        for config in [ClassifierConfig::default(), ClassifierConfig::with_secondary()] {
            for max in [10.0, 150.0, 350.0, 499.0] {
                let m = metrics(max);
                let mut previous = RiskTier::Low;
                for step in 0..=200 {
                    let tier = config.classify(step as f64 / 2.0, &m);
                    assert!(
                        tier.rank() >= previous.rank(),
                        "tier dropped at score {} with max {max}",
                        step as f64 / 2.0
                    );
                    previous = tier;
                }
            }
        }
    }

    #[test]
    fn test_validate_rejects_inverted_bands() {
        let config = ClassifierConfig {
            critical_score: 40.0,
            high_score: 60.0,
            medium_score: 80.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_secondary_above_primary() {
        let mut config = ClassifierConfig::with_secondary();
        if let Some(secondary) = &mut config.secondary {
            secondary.critical_score = 90.0;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tier_ordering() {
        assert!(RiskTier::Critical > RiskTier::High);
        assert!(RiskTier::High > RiskTier::Medium);
        assert!(RiskTier::Medium > RiskTier::Low);
        assert_eq!(RiskTier::Critical.as_str(), "CRITICAL");
        assert_eq!(RiskTier::Critical.localized_label(), "CRÍTICO");
    }
}
