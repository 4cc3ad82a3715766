//! Core domain records
//!
//! KEEP data-only: no scoring logic lives here.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A monitored individual. Identity is immutable; category and enrollment
/// date are edited by the administration surface, never by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// External unique identifier, e.g. "EMP042".
    pub external_id: String,
    pub display_name: String,
    /// Organizational grouping, e.g. department.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_on: Option<NaiveDate>,
}

/// One sensor measurement. Immutable once created; timestamp ordering is
/// significant for tenure and frequency computations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// External identifier of the owning subject.
    pub subject_id: String,
    /// Raw analog reading from the sensor ADC.
    pub raw_reading: i32,
    pub voltage: f64,
    /// Derived concentration in ppm, never negative.
    pub concentration_ppm: f64,
    pub taken_at: DateTime<Utc>,
}

impl Sample {
    /// A sample counts toward scoring only when it registered something.
    pub fn is_positive(&self) -> bool {
        self.concentration_ppm > 0.0
    }
}

/// A scoring criterion from the externally managed configuration table.
/// Read as an immutable snapshot per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    /// Metric binding, resolved through [`MetricKind::parse`].
    pub metric: String,
    /// Relative importance, positive.
    pub weight: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// The per-subject metrics a criterion can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    MaxConcentration,
    PositiveCount,
    MeanConcentration,
    StdDeviation,
    SampleDensity,
}

impl MetricKind {
    /// Resolve a criterion's metric binding. Unknown names return `None`
    /// and the criterion drops out of the score with renormalization.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "max_concentration" | "max_ppm" => Some(Self::MaxConcentration),
            "positive_count" | "frequency" => Some(Self::PositiveCount),
            "mean_concentration" | "mean_ppm" => Some(Self::MeanConcentration),
            "std_deviation" | "variability" => Some(Self::StdDeviation),
            "sample_density" => Some(Self::SampleDensity),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxConcentration => "max_concentration",
            Self::PositiveCount => "positive_count",
            Self::MeanConcentration => "mean_concentration",
            Self::StdDeviation => "std_deviation",
            Self::SampleDensity => "sample_density",
        }
    }
}

static DEFAULT_CRITERIA: Lazy<Vec<Criterion>> = Lazy::new(|| {
    vec![
        Criterion {
            name: "Average Concentration".to_string(),
            metric: "mean_concentration".to_string(),
            weight: 0.35,
            active: true,
        },
        Criterion {
            name: "Peak Concentration".to_string(),
            metric: "max_concentration".to_string(),
            weight: 0.35,
            active: true,
        },
        Criterion {
            name: "Measurement Frequency".to_string(),
            metric: "positive_count".to_string(),
            weight: 0.15,
            active: true,
        },
        Criterion {
            name: "Variability".to_string(),
            metric: "std_deviation".to_string(),
            weight: 0.15,
            active: true,
        },
    ]
});

/// Built-in criterion table, used when the store carries none.
pub fn default_criteria() -> Vec<Criterion> {
    DEFAULT_CRITERIA.clone()
}
