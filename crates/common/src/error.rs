//! Error types shared across Montage crates.
//!
//! Domain-specific errors live with their domains (the timeline model
//! and the render orchestrator define their own); this type covers the
//! ambient concerns of configuration, state files, and I/O plumbing.

use std::path::PathBuf;

/// Infrastructure-level error for Montage operations.
#[derive(Debug, thiserror::Error)]
pub enum MontageError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MontageError.
pub type MontageResult<T> = Result<T, MontageError>;

impl MontageError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
