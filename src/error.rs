//! Run-level failures of the analysis pipeline.
//!
//! Empty detections are not errors: zero roofs, obstacles or panels are
//! reported as empty collections. Degenerate candidate polygons are dropped
//! inside the segmenter and never surface here.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Corrupt or empty raster, bad scale or location. Raised before segmentation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Parameter validation failed. Raised before any image is processed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The caller abandoned the run before per-region results were merged.
    #[error("analysis cancelled")]
    Cancelled,
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
