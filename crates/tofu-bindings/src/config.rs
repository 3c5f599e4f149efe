//! Build configuration
//!
//! Defaults mirror the CI environment: the server is reachable at
//! `https://pulp` under `/pulp/`, the OpenAPI generator is checked out next
//! to the plugin, and archives land in the plugin checkout.

use std::path::{Path, PathBuf};

/// Service URL used when neither `--pulp-url` nor `PULP_URL` is given.
pub const DEFAULT_PULP_URL: &str = "https://pulp";

/// API root used when neither `--api-root` nor `PULP_API_ROOT` is given.
pub const DEFAULT_API_ROOT: &str = "/pulp/";

/// Configuration for one client binding build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingsConfig {
    /// Service base URL (scheme and host, no API root).
    pub pulp_url: String,
    /// API root path, always with leading and trailing slash.
    pub api_root: String,
    /// Component label reported by the status endpoint.
    pub component: String,
    /// Older component name some servers still report.
    pub legacy_component: String,
    /// Python package name of the plugin; the generator names its output
    /// directory `<package>-client`.
    pub package: String,
    /// Generator target language.
    pub language: String,
    /// Plugin checkout (used for `git describe`).
    pub plugin_dir: PathBuf,
    /// OpenAPI generator checkout containing `generate.sh`.
    pub generator_dir: PathBuf,
    /// Directory receiving the produced archives.
    pub output_dir: PathBuf,
    /// Accept self-signed certificates from the service.
    pub insecure_tls: bool,
    /// Timeout for each external tool, in seconds.
    pub stage_timeout_secs: u64,
}

impl BindingsConfig {
    /// Create a config for a specific service.
    pub fn new(pulp_url: &str, api_root: &str) -> Self {
        BindingsConfig {
            pulp_url: pulp_url.trim_end_matches('/').to_string(),
            api_root: normalize_api_root(api_root),
            component: "tofu".to_string(),
            legacy_component: "pulp_tofu".to_string(),
            package: "pulp_tofu".to_string(),
            language: "python".to_string(),
            plugin_dir: PathBuf::from("."),
            generator_dir: PathBuf::from("../pulp-openapi-generator"),
            output_dir: PathBuf::from("."),
            insecure_tls: false,
            stage_timeout_secs: tofu_ci::stage::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the plugin checkout. The output directory follows it.
    pub fn with_plugin_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.plugin_dir = dir.as_ref().to_path_buf();
        self.output_dir = self.plugin_dir.clone();
        self
    }

    /// Set the generator checkout.
    pub fn with_generator_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.generator_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the archive output directory.
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Accept invalid TLS certificates.
    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_tls = insecure;
        self
    }

    /// Set the per-stage timeout.
    pub fn with_stage_timeout(mut self, secs: u64) -> Self {
        self.stage_timeout_secs = secs;
        self
    }

    /// `GET` endpoint reporting installed component versions.
    pub fn status_url(&self) -> String {
        format!("{}{}api/v3/status/", self.pulp_url, self.api_root)
    }

    /// Bindings-ready schema for this plugin's component.
    pub fn schema_url(&self) -> String {
        format!(
            "{}{}api/v3/docs/api.json?bindings&component={}",
            self.pulp_url, self.api_root, self.component
        )
    }

    /// Directory the generator writes the client package into.
    pub fn client_dir(&self) -> PathBuf {
        self.generator_dir.join(format!("{}-client", self.package))
    }

    /// Where the generator picks up a locally fetched schema.
    pub fn local_schema_path(&self) -> PathBuf {
        self.generator_dir.join("api.json")
    }

    /// Archive holding the built distributions.
    pub fn client_archive_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}-client.tar", self.component, self.language))
    }

    /// Archive holding the built documentation site.
    pub fn docs_archive_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}-client-docs.tar", self.component, self.language))
    }
}

fn normalize_api_root(api_root: &str) -> String {
    let trimmed = api_root.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
