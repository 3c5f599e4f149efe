//! Idempotent gem publishing.
//!
//! A version is pushed at most once: if the registry already lists it the
//! run is a successful no-op. Otherwise the credentials file is written with
//! owner-only permissions before `gem push` runs.

use crate::config::RegistryConfig;
use crate::credentials::{default_credentials_path, write_credentials};
use crate::error::{GemError, Result};
use crate::registry::GemRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// What a publish run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The registry already had this version; nothing was pushed.
    AlreadyPublished { gem: String, version: String },
    /// The gem was pushed.
    Published { gem: String, version: String, gem_file: PathBuf },
}

/// Validate the version argument.
///
/// Missing or blank versions are rejected with [`GemError::NoVersion`].
pub fn require_version(arg: Option<&str>) -> Result<String> {
    match arg.map(str::trim) {
        Some(version) if !version.is_empty() => Ok(version.to_string()),
        _ => Err(GemError::NoVersion),
    }
}

/// Publishes one gem version through a [`GemRegistry`].
pub struct GemPublisher {
    registry: Arc<dyn GemRegistry>,
    config: RegistryConfig,
}

impl GemPublisher {
    pub fn new(registry: Arc<dyn GemRegistry>, config: RegistryConfig) -> Self {
        Self { registry, config }
    }

    /// Publish `version` unless it is already released.
    pub async fn publish(&self, version: &str) -> Result<PublishOutcome> {
        let version = require_version(Some(version))?;
        let gem = self.config.gem_name.clone();

        if self.registry.has_version(&gem, &version).await? {
            info!(gem = %gem, version = %version, "Already released, skipping");
            return Ok(PublishOutcome::AlreadyPublished { gem, version });
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GemError::MissingApiKey)?;

        let gem_file = self.config.gem_file(&version);
        if !tokio::fs::try_exists(&gem_file).await? {
            return Err(GemError::GemFileNotFound(gem_file));
        }

        let credentials_path = match &self.config.credentials_path {
            Some(path) => path.clone(),
            None => default_credentials_path()?,
        };
        write_credentials(&credentials_path, api_key)?;

        self.registry.push(&gem_file).await?;
        info!(gem = %gem, version = %version, "Published");

        Ok(PublishOutcome::Published {
            gem,
            version,
            gem_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_version_missing() {
        let err = require_version(None).unwrap_err();
        assert!(matches!(err, GemError::NoVersion));
        assert_eq!(err.to_string(), "No version specified.");
    }

    #[test]
    fn test_require_version_blank() {
        assert!(matches!(require_version(Some("  ")), Err(GemError::NoVersion)));
    }

    #[test]
    fn test_require_version_trims() {
        assert_eq!(require_version(Some(" 0.1.0\n")).unwrap(), "0.1.0");
    }
}
