//! Error handling

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed filter value; rejected before extraction begins.
    #[error("invalid filter input: {0}")]
    InvalidFilter(String),

    /// Fatal configuration problem; the run aborts with no partial output.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure while processing a single subject. The extractor isolates
    /// this: the subject is skipped and the run continues.
    #[error("subject {id}: {reason}")]
    SubjectExtraction { id: String, reason: String },

    /// Underlying data read failed.
    #[error("store error: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export. Callers report a "no data" condition instead of
    /// writing an empty file.
    #[error("result set is empty, nothing to export")]
    EmptyResult,

    /// Optional rendering backend missing at runtime.
    #[error("PDF rendering backend is not available")]
    RendererUnavailable,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
