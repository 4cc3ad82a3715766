//! BreathSense Risk Analytics Core
//!
//! Turns repeated breath-sensor measurements into a 0-100 risk score and a
//! categorical tier per subject, using pairwise-comparison (AHP) weighting,
//! and exposes independent correlation diagnostics for sensor calibration
//! and tenure trends.
//!
//! ## Structure
//! - `weights` - pairwise comparison matrix and weight solver
//! - `metrics` - filtered per-subject metric extraction
//! - `scoring` - normalization, score calculation, risk tiers, pipeline
//! - `correlation` - sensor linearity and tenure diagnostics
//! - `export` - delimited text and printable report surfaces
//! - `store` - read-only data access trait + in-memory implementation
//!
//! ## Usage
//! ```ignore
//! use breathsense_core::{AnalysisRequest, MemoryStore, RiskAnalyzer};
//!
//! let store = MemoryStore::load("dataset.json")?;
//! let analyzer = RiskAnalyzer::with_pairwise(&store, 3.0)?;
//! let report = analyzer.analyze(&AnalysisRequest::default())?;
//! for record in &report.records {
//!     println!("{} {:.2} {}", record.external_id, record.score, record.tier);
//! }
//! ```

pub mod constants;
pub mod correlation;
pub mod domain;
pub mod error;
pub mod export;
pub mod metrics;
pub mod scoring;
pub mod store;
pub mod weights;

// Re-export the main surface for convenience
pub use correlation::{
    diagnose_sensors, diagnose_tenure, diagnose_tenure_at, SensorDiagnostic, SensorVerdict,
    TenureDiagnostic, TenureVerdict,
};
pub use domain::{Criterion, MetricKind, Sample, Subject};
pub use error::{EngineError, EngineResult, ExportError};
pub use metrics::{ExtractionOutcome, SampleFilter, SubjectMetrics};
pub use scoring::{
    AnalysisReport, AnalysisRequest, AnalysisSummary, ClassifierConfig, NormalizationPolicy,
    RiskAnalyzer, RiskTier, ScoreRecord, SortDirection,
};
pub use store::{Dataset, MemoryStore, SampleStore};
pub use weights::{EigenSolver, PairwiseMatrix, PowerIteration, WeightInput, WeightVector};
