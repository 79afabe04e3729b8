// src/error.rs - Extraction error taxonomy
use thiserror::Error;

/// Failures that can occur after dispatch. None of these escape the
/// pipeline boundary: they are folded into `success: false` result values
/// and the process still exits 0.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not read image: {0}")]
    ImageUnreadable(String),

    #[error("Could not open video: {0}")]
    VideoUnopenable(String),

    #[error("FFmpeg is not installed or not in PATH")]
    FfmpegMissing,
}
