//! Error types shared across Vidweave crates.

use std::path::PathBuf;

/// Top-level error type for Vidweave operations.
#[derive(Debug, thiserror::Error)]
pub enum VidweaveError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Engine error: {message}")]
    Engine { message: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VidweaveError.
pub type VidweaveResult<T> = Result<T, VidweaveError>;

/// Coarse failure category reported to callers.
///
/// A failure response identifies the category instead of the full error,
/// so it never carries working-directory paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Processing,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Processing => "processing",
        }
    }
}

impl VidweaveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine {
            message: msg.into(),
        }
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// The category a caller-facing failure response should report.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            _ => ErrorCategory::Processing,
        }
    }
}
