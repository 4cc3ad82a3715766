//! Population-relative normalization
//!
//! Always recomputed against the current filtered population; the
//! population shifts as samples arrive, so nothing is cached between
//! invocations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationPolicy {
    /// `value / population_max`. A zero population max maps everything
    /// to 0.
    MaxValue,
    /// `(value - min) / (max - min)`. Without variance every value maps to
    /// the neutral 0.5 instead of dividing by zero.
    MinMax,
}

pub fn normalize(values: &[f64], policy: NormalizationPolicy) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    match policy {
        NormalizationPolicy::MaxValue => {
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if max <= 0.0 {
                return vec![0.0; values.len()];
            }
            values.iter().map(|v| v / max).collect()
        }
        NormalizationPolicy::MinMax => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if max == min {
                return vec![0.5; values.len()];
            }
            values.iter().map(|v| (v - min) / (max - min)).collect()
        }
    }
}
