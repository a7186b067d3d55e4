//! Centralized error types for testgen.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;
use crate::validate::Diagnostic;

/// Main error type for testgen operations.
#[derive(Error, Debug)]
pub enum TestgenError {
    #[error("Failed to parse {format} spec {}: {message}", path.display())]
    SpecParse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Unknown template kind: '{kind}'. Available: {}", available.join(", "))]
    UnknownTemplateKind {
        kind: String,
        available: Vec<String>,
    },

    #[error("Template error: {0}")]
    TemplateRender(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Backend returned no text")]
    EmptyResponse,

    #[error("Syntax error in generated code: {0}")]
    ValidationFailure(Diagnostic),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for testgen operations.
pub type TestgenResult<T> = Result<T, TestgenError>;

impl TestgenError {
    /// Create an IO error bound to the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a template error.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::TemplateRender(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
