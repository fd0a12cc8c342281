//! Source error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors raised while starting or running an input source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to resolve server address {addr}: {reason}")]
    Resolve { addr: String, reason: String },

    #[error("Failed to create UDP listener: {0}")]
    Bind(std::io::Error),

    #[error("File {} not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Line exceeds the maximum length of {limit} bytes")]
    LineTooLong { limit: usize },
}
