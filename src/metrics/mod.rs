//! Metric Extractor
//!
//! Aggregates per-subject statistics from the filtered sample population.
//!
//! ## Structure
//! - `filter`: category and inclusive date-range filter
//! - `extractor`: per-subject metric records and population helpers

pub mod extractor;
pub mod filter;

pub use extractor::{
    categories, extract, sample_date_range, ExtractionOutcome, SubjectMetrics,
};
pub use filter::SampleFilter;
