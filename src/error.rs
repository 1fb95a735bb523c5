use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Typed root causes carried inside `anyhow::Error`.
///
/// Callers that need to branch on a failure kind can
/// `err.downcast_ref::<VisionError>()`.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("input not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported image format for {}: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("pixel buffer invalid: {0}")]
    InvalidBuffer(String),

    #[error("frame extraction failed: {0}")]
    Extraction(String),

    #[error("frame extraction timed out after {}s", after.as_secs())]
    Timeout { after: Duration },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}
