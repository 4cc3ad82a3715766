//! Correlation Analyzer
//!
//! Independent diagnostics over the raw sample population. Does not touch
//! the scoring pipeline.
//!
//! - Sensor linearity: voltage vs concentration across all samples.
//! - Tenure risk: subject tenure vs concentration, plus mean concentration
//!   per category.

pub mod analyzer;
pub mod pearson;

pub use analyzer::{
    diagnose_sensors, diagnose_tenure, diagnose_tenure_at, SensorDiagnostic, SensorVerdict,
    TenureDiagnostic, TenureVerdict,
};
pub use pearson::pearson;
