// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Transient provider error: {0}")]
    ProviderTransient(String),

    #[error("Provider rejected request: {0}")]
    ProviderFatal(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuth(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Section {section} cannot follow {previous}")]
    SectionOrder { previous: String, section: String },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn serialization<E: std::fmt::Display>(e: E) -> Self {
        Self::Serialization(e.to_string())
    }

    pub fn config<E: std::fmt::Display>(e: E) -> Self {
        Self::Config(e.to_string())
    }

    /// Errors that abort the whole run rather than degrading a single unit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::Config(_)
                | PipelineError::RepositoryUnavailable(_)
                | PipelineError::ProviderAuth(_)
                | PipelineError::Cancelled
                | PipelineError::Timeout(_)
        )
    }
}
