//! Error types for gem-registry

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing a gem
#[derive(Error, Debug)]
pub enum GemError {
    /// No version given on the command line
    #[error("No version specified.")]
    NoVersion,

    /// Publishing needs an API key
    #[error("RUBYGEMS_API_KEY is not set")]
    MissingApiKey,

    /// Home directory could not be determined for the credentials file
    #[error("Cannot determine home directory for gem credentials")]
    HomeDirUnavailable,

    /// Built gem is not where it is expected
    #[error("Gem file not found: {0:?}")]
    GemFileNotFound(PathBuf),

    /// `gem push` failed
    #[error("gem push failed: {0}")]
    PushFailed(String),

    /// HTTP error (registry API)
    #[error("HTTP error: {0}")]
    Http(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GemError {
    fn from(err: reqwest::Error) -> Self {
        GemError::Http(err.to_string())
    }
}

impl From<tofu_ci::PipelineError> for GemError {
    fn from(err: tofu_ci::PipelineError) -> Self {
        GemError::PushFailed(err.to_string())
    }
}

/// Result type for gem-registry operations
pub type Result<T> = std::result::Result<T, GemError>;
