//! Error types for binding generation

use std::path::PathBuf;
use thiserror::Error;
use tofu_ci::PipelineError;

/// Errors that can occur while building the client bindings
#[derive(Error, Debug)]
pub enum BindingsError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success status
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// Component missing from the status report
    #[error("Component {0} is not installed on the server")]
    ComponentNotFound(String),

    /// Component reported with an empty version string
    #[error("Component {0} reported an empty version")]
    EmptyVersion(String),

    /// Version string could not be parsed
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// Expected build artifact is missing
    #[error("No artifact matching {pattern} in {dir:?}")]
    MissingArtifact { dir: PathBuf, pattern: String },

    /// Expected input file is missing
    #[error("Required file not found: {0:?}")]
    MissingFile(PathBuf),

    /// External tool stage failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Join(String),
}

impl From<reqwest::Error> for BindingsError {
    fn from(err: reqwest::Error) -> Self {
        BindingsError::Http(err.to_string())
    }
}

impl From<tokio::task::JoinError> for BindingsError {
    fn from(err: tokio::task::JoinError) -> Self {
        BindingsError::Join(err.to_string())
    }
}

/// Result type for binding generation
pub type Result<T> = std::result::Result<T, BindingsError>;
