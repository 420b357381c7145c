//! Template engine error types

use thiserror::Error;

/// Template-specific errors
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Template override directory is missing
    #[error("Template directory not found: {0}")]
    NotFound(String),

    /// Template parsing or rendering error
    #[error("Template error: {0}")]
    TemplateError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
