// SPDX-License-Identifier: GPL-3.0-only

//! Error types for photo capture

use std::fmt;
use std::path::PathBuf;

/// Result type alias using CaptureError
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Capture error type
///
/// Every variant is reported to the caller as a single failure message;
/// none of them is allowed to escape the pipeline boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// Camera session or device handle could not be obtained
    SessionUnavailable(String),
    /// Output directory could not be created
    DirectoryCreateFailed(PathBuf),
    /// Image could not be decoded or re-encoded
    DecodeOrEncodeFailed(String),
    /// Operation not supported by the active backend
    Unsupported(String),
    /// Capture or flash options rejected before any work started
    InvalidOptions(String),
    /// Flash control failed
    Flash(String),
    /// Filesystem errors
    Io(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::SessionUnavailable(msg) => write!(f, "{}", msg),
            CaptureError::DirectoryCreateFailed(path) => {
                write!(f, "Failed to create directory: {}", path.display())
            }
            CaptureError::DecodeOrEncodeFailed(msg) => write!(f, "Image processing failed: {}", msg),
            CaptureError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            CaptureError::InvalidOptions(msg) => write!(f, "Invalid options: {}", msg),
            CaptureError::Flash(msg) => write!(f, "Flash error: {}", msg),
            CaptureError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err.to_string())
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => CaptureError::Io(e.to_string()),
            other => CaptureError::DecodeOrEncodeFailed(other.to_string()),
        }
    }
}
