//! Gem registry client
//!
//! Version lookups go through the registry's HTTP API; uploads go through
//! the `gem` CLI, which reads the credentials file written beforehand.

use crate::config::RegistryConfig;
use crate::error::{GemError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::Path;
use tofu_ci::{StageConfig, StageRunner};
use tracing::{debug, info, warn};

/// Timeout for `gem push`, in seconds.
const PUSH_TIMEOUT_SECS: u64 = 600;

/// Operations the publish flow needs from a registry.
#[async_trait]
pub trait GemRegistry: Send + Sync {
    /// Whether `version` of `gem` is already released.
    async fn has_version(&self, gem: &str, version: &str) -> Result<bool>;

    /// Upload a built gem file.
    async fn push(&self, gem_file: &Path) -> Result<()>;
}

/// rubygems.org (or compatible) registry client
pub struct RubyGemsClient {
    config: RegistryConfig,
    http_client: reqwest::Client,
}

impl RubyGemsClient {
    /// Create a new registry client
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("tofu-release/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client around a preconfigured `reqwest::Client`
    pub fn with_http_client(config: RegistryConfig, http_client: reqwest::Client) -> Self {
        RubyGemsClient {
            config,
            http_client,
        }
    }

    /// Command line used to push `gem_file`
    pub fn push_command(&self, gem_file: &Path) -> Vec<String> {
        let mut command = vec![
            "gem".to_string(),
            "push".to_string(),
            gem_file.to_string_lossy().to_string(),
        ];
        if !self.config.is_default_registry() {
            command.push("--host".to_string());
            command.push(self.config.registry_url.clone());
        }
        command
    }
}

#[async_trait]
impl GemRegistry for RubyGemsClient {
    async fn has_version(&self, gem: &str, version: &str) -> Result<bool> {
        let config = RegistryConfig {
            gem_name: gem.to_string(),
            ..self.config.clone()
        };
        let url = config.version_url(version);
        debug!(url = %url, "Checking registry for version");

        let status = self.http_client.get(&url).send().await?.status();
        match status {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => {
                // Only an explicit 200 counts as released; the push itself
                // rejects duplicates if the lookup was wrong.
                warn!(status = other.as_u16(), url = %url, "Unexpected registry response");
                Ok(false)
            }
        }
    }

    async fn push(&self, gem_file: &Path) -> Result<()> {
        info!(gem = ?gem_file, registry = %self.config.registry_url, "Pushing gem");

        let stage = StageConfig::custom(
            "gem_push".to_string(),
            self.push_command(gem_file),
            PUSH_TIMEOUT_SECS,
        );
        let result = StageRunner::execute_stage(&stage).await?;

        if result.passed() {
            debug!(output = %result.stdout.trim(), "gem push succeeded");
            Ok(())
        } else {
            let detail = if result.stderr.trim().is_empty() {
                result.stdout.trim().to_string()
            } else {
                result.stderr.trim().to_string()
            };
            Err(GemError::PushFailed(format!(
                "exit code {}: {}",
                result.exit_code, detail
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_GEM_NAME, DEFAULT_REGISTRY_URL};
    use std::path::PathBuf;

    #[test]
    fn test_push_command_default_registry() {
        let client =
            RubyGemsClient::new(RegistryConfig::new(DEFAULT_REGISTRY_URL, DEFAULT_GEM_NAME))
                .unwrap();
        assert_eq!(
            client.push_command(&PathBuf::from("pulp_tofu_client-0.1.0.gem")),
            vec!["gem", "push", "pulp_tofu_client-0.1.0.gem"]
        );
    }

    #[test]
    fn test_push_command_custom_host() {
        let client = RubyGemsClient::new(RegistryConfig::new(
            "https://gems.example.com",
            DEFAULT_GEM_NAME,
        ))
        .unwrap();
        let cmd = client.push_command(&PathBuf::from("x.gem"));
        assert_eq!(cmd[3], "--host");
        assert_eq!(cmd[4], "https://gems.example.com");
    }
}
