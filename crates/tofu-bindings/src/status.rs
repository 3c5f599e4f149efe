//! Service status endpoint client.
//!
//! The status endpoint lists every installed component with its version.
//! Only the `versions` list is modelled; other fields are ignored.

use crate::config::BindingsConfig;
use crate::error::{BindingsError, Result};
use crate::version::ComponentVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Core version from which the server can render a bindings-ready schema
/// for a single component.
pub const LOCAL_SCHEMA_MIN_CORE: &str = "3.44.0.dev";

/// One installed component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentStatus {
    /// Component label (`core`, `tofu`, ...)
    pub component: String,
    /// Installed version
    pub version: String,
    /// Python package name, absent on older servers
    #[serde(default)]
    pub package: Option<String>,
}

/// Subset of the status endpoint response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusReport {
    #[serde(default)]
    pub versions: Vec<ComponentStatus>,
}

impl StatusReport {
    /// Parse a raw status response body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Version of the first component matching any of `names`.
    ///
    /// Fails when no component matches or the reported version is blank.
    pub fn component_version(&self, names: &[&str]) -> Result<String> {
        let status = self
            .versions
            .iter()
            .find(|v| names.contains(&v.component.as_str()))
            .ok_or_else(|| BindingsError::ComponentNotFound(names.join("|")))?;

        let version = status.version.trim();
        if version.is_empty() {
            return Err(BindingsError::EmptyVersion(status.component.clone()));
        }
        Ok(version.to_string())
    }

    /// Whether the installed `core` can serve a bindings-ready schema for a
    /// single component (`api.json?bindings&component=...`).
    ///
    /// A missing or unreadable `core` version leaves the schema fetch to the
    /// generator.
    pub fn supports_component_schema(&self) -> bool {
        let reported = match self.component_version(&["core"]) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "No usable core version in status report");
                return false;
            }
        };
        match (
            ComponentVersion::parse(&reported),
            ComponentVersion::parse(LOCAL_SCHEMA_MIN_CORE),
        ) {
            (Ok(core), Ok(minimum)) => core >= minimum,
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Cannot compare core version");
                false
            }
        }
    }
}

/// HTTP client for the service's status and schema endpoints.
pub struct StatusClient {
    config: BindingsConfig,
    http_client: reqwest::Client,
}

impl StatusClient {
    /// Create a client for the configured service.
    pub fn new(config: BindingsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("tofu-release/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()?;

        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client around a preconfigured `reqwest::Client`.
    pub fn with_http_client(config: BindingsConfig, http_client: reqwest::Client) -> Self {
        StatusClient {
            config,
            http_client,
        }
    }

    /// Fetch and parse the status report.
    pub async fn fetch_status(&self) -> Result<StatusReport> {
        let url = self.config.status_url();
        debug!(url = %url, "Fetching service status");
        let body = self.get_bytes(&url).await?;
        StatusReport::from_json(&body)
    }

    /// Download the component's bindings schema to `dest`.
    pub async fn fetch_schema(&self, dest: &Path) -> Result<u64> {
        let url = self.config.schema_url();
        info!(url = %url, dest = ?dest, "Fetching API schema");
        let body = self.get_bytes(&url).await?;

        // Fail before writing anything the generator could pick up.
        let _: serde_json::Value = serde_json::from_slice(&body)?;

        tokio::fs::write(dest, &body).await?;
        Ok(body.len() as u64)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BindingsError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
