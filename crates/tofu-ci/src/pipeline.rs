//! Fail-fast pipeline orchestration.

use crate::error::{PipelineError, Result};
use crate::runner::{StageResult, StageRunner};
use crate::stage::StageConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Result of a complete pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Unique id of this run, used to correlate log lines.
    pub run_id: String,

    /// Pipeline name.
    pub name: String,

    /// Whether all executed stages passed.
    pub success: bool,

    /// Results of the executed stages, in order.
    pub stages: Vec<StageResult>,

    /// When the pipeline started.
    pub started_at: DateTime<Utc>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,

    /// Error that aborted the run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    /// Number of stages that passed.
    pub fn passed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.passed()).count()
    }

    /// Number of stages that failed.
    pub fn failed_count(&self) -> usize {
        self.stages.iter().filter(|s| !s.passed()).count()
    }

    /// Write this result as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Sequential pipeline that aborts on the first failing stage.
///
/// Drivers interleave their own in-process steps with `run_stage` calls and
/// propagate the returned error with `?`, so nothing after a failing stage
/// ever runs.
pub struct Pipeline {
    run_id: Uuid,
    name: String,
    started_at: DateTime<Utc>,
    start: Instant,
    stages: Vec<StageResult>,
}

impl Pipeline {
    /// Start a new pipeline run.
    pub fn start(name: impl Into<String>) -> Self {
        let pipeline = Self {
            run_id: Uuid::new_v4(),
            name: name.into(),
            started_at: Utc::now(),
            start: Instant::now(),
            stages: Vec::new(),
        };
        info!(run_id = %pipeline.run_id, pipeline = %pipeline.name, "Starting pipeline");
        pipeline
    }

    /// Run id of this pipeline.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Results recorded so far.
    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    /// Execute one stage. Disabled stages are skipped and return `None`.
    ///
    /// Returns `PipelineError::StageFailed` when the command exits non-zero.
    pub async fn run_stage(&mut self, config: &StageConfig) -> Result<Option<&StageResult>> {
        if !config.enabled {
            info!(stage = %config.name, "Skipping disabled stage");
            return Ok(None);
        }

        info!(stage = %config.name, command = %config.display_command(), "Executing stage");

        let result = StageRunner::execute_stage(config).await.map_err(|e| {
            error!(stage = %config.name, error = %e, "Stage could not run");
            e
        })?;

        if !result.passed() {
            error!(
                stage = %result.stage_name,
                exit_code = result.exit_code,
                "Stage failed"
            );
            let err = PipelineError::StageFailed {
                stage: result.stage_name.clone(),
                exit_code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            };
            self.stages.push(result);
            return Err(err);
        }

        info!(
            stage = %result.stage_name,
            duration_ms = result.duration_ms,
            "Stage passed"
        );
        self.stages.push(result);
        Ok(self.stages.last())
    }

    /// Execute all stages in order, stopping at the first failure.
    pub async fn run_all(&mut self, stages: &[StageConfig]) -> Result<()> {
        for config in stages {
            self.run_stage(config).await?;
        }
        Ok(())
    }

    /// Finish the run and produce its result.
    pub fn finish(self) -> PipelineResult {
        self.conclude(None)
    }

    /// Finish a run that was aborted by `error`.
    ///
    /// The error may come from a stage or from the driver's own steps; the
    /// result is never successful.
    pub fn abort(self, error: impl std::fmt::Display) -> PipelineResult {
        self.conclude(Some(error.to_string()))
    }

    fn conclude(self, error: Option<String>) -> PipelineResult {
        let duration_ms = self.start.elapsed().as_millis() as u64;
        let success = error.is_none() && self.stages.iter().all(|s| s.passed());

        if success {
            info!(run_id = %self.run_id, duration_ms, "Pipeline completed successfully");
        } else {
            error!(
                run_id = %self.run_id,
                duration_ms,
                error = error.as_deref().unwrap_or("stage failed"),
                "Pipeline failed"
            );
        }

        PipelineResult {
            run_id: self.run_id.to_string(),
            name: self.name,
            success,
            stages: self.stages,
            started_at: self.started_at,
            duration_ms,
            error,
        }
    }
}
