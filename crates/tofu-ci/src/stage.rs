//! Stage definitions and configuration.

use std::path::{Path, PathBuf};

/// Default timeout for a stage, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// Configuration for a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    /// Human-readable stage name.
    pub name: String,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Directory the command runs in (inherits the current one if unset).
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables for the command.
    pub env: Vec<(String, String)>,

    /// Timeout in seconds (0 disables the timeout).
    pub timeout_secs: u64,

    /// Whether this stage is enabled.
    pub enabled: bool,
}

impl StageConfig {
    /// Create a stage from a name and a command line.
    pub fn new<I, S>(name: impl Into<String>, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            command: command.into_iter().map(Into::into).collect(),
            working_dir: None,
            env: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enabled: true,
        }
    }

    /// Create a custom stage configuration with an explicit timeout.
    pub fn custom(name: String, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            name,
            command,
            working_dir: None,
            env: Vec::new(),
            timeout_secs,
            enabled: true,
        }
    }

    /// Run the command inside `dir`.
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Override the timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Disable this stage.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The command line joined with spaces, for logs.
    pub fn display_command(&self) -> String {
        self.command.join(" ")
    }
}
