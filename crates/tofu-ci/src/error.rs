//! Error types for stage pipelines

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage {0} has empty command")]
    EmptyCommand(String),

    #[error("Failed to start stage {stage}: {source}")]
    Spawn {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stage {stage} timed out after {timeout_secs} seconds")]
    Timeout { stage: String, timeout_secs: u64 },

    #[error("Stage '{stage}' exited with code {exit_code}: {stderr}")]
    StageFailed {
        stage: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Name of the stage this error belongs to, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::EmptyCommand(stage) => Some(stage),
            PipelineError::Spawn { stage, .. }
            | PipelineError::Timeout { stage, .. }
            | PipelineError::StageFailed { stage, .. } => Some(stage),
            PipelineError::Io(_) | PipelineError::Serialization(_) => None,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
