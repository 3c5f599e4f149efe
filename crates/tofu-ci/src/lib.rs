//! tofu-ci - fail-fast stage pipelines for release tooling
//!
//! Provides the pieces shared by the release drivers:
//! - Stage definitions (external commands with working dir, env and timeout)
//! - A runner that executes one stage and captures its output
//! - A pipeline that runs stages in order and aborts on the first failure
//! - Tracing initialisation for the binary

pub mod error;
pub mod pipeline;
pub mod runner;
pub mod stage;
pub mod telemetry;

// Re-export key types
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineResult};
pub use runner::{StageResult, StageRunner};
pub use stage::StageConfig;
pub use telemetry::init_tracing;
