//! Export surfaces
//!
//! Mechanical rendering of a scored result set. A zero-row set is an
//! explicit error, never a silently empty file.
//!
//! ## Structure
//! - `csv`: BOM-prefixed delimited text
//! - `report`: fixed-page printable report model + pluggable PDF backend

pub mod csv;
pub mod report;

pub use csv::{to_csv, write_csv};
pub use report::{
    build_report, render_pdf, render_text, PdfRenderer, Report, ReportLayout, ReportPage,
};
