//! Registry configuration

use std::path::{Path, PathBuf};

/// Public registry used when `GEM_REGISTRY_URL` is unset.
pub const DEFAULT_REGISTRY_URL: &str = "https://rubygems.org";

/// Gem published by default.
pub const DEFAULT_GEM_NAME: &str = "pulp_tofu_client";

/// Registry configuration
#[derive(Clone)]
pub struct RegistryConfig {
    /// Registry base URL
    pub registry_url: String,
    /// Gem name
    pub gem_name: String,
    /// Directory holding `<gem>-<version>.gem`
    pub gem_dir: PathBuf,
    /// Credentials file (defaults to `~/.gem/credentials`)
    pub credentials_path: Option<PathBuf>,
    /// API key written to the credentials file
    pub api_key: Option<String>,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("registry_url", &self.registry_url)
            .field("gem_name", &self.gem_name)
            .field("gem_dir", &self.gem_dir)
            .field("credentials_path", &self.credentials_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl RegistryConfig {
    /// Create a config from `GEM_REGISTRY_URL` and `RUBYGEMS_API_KEY`
    ///
    /// The API key is only ever taken from the environment.
    pub fn from_env() -> Self {
        Self::default()
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let registry_url = lookup("GEM_REGISTRY_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());
        let mut config = Self::new(&registry_url, DEFAULT_GEM_NAME);
        config.api_key = lookup("RUBYGEMS_API_KEY").filter(|key| !key.is_empty());
        config
    }

    /// Create config for a specific registry and gem
    pub fn new(registry_url: &str, gem_name: &str) -> Self {
        RegistryConfig {
            registry_url: registry_url.trim_end_matches('/').to_string(),
            gem_name: gem_name.to_string(),
            gem_dir: PathBuf::from("."),
            credentials_path: None,
            api_key: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Set the registry base URL
    pub fn with_registry_url(mut self, registry_url: &str) -> Self {
        self.registry_url = registry_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the gem name
    pub fn with_gem_name(mut self, gem_name: &str) -> Self {
        self.gem_name = gem_name.to_string();
        self
    }

    /// Set the directory holding the built gem
    pub fn with_gem_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.gem_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set an explicit credentials file
    pub fn with_credentials_path(mut self, path: impl AsRef<Path>) -> Self {
        self.credentials_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Whether this points at the public rubygems.org registry
    pub fn is_default_registry(&self) -> bool {
        self.registry_url.trim_end_matches('/') == DEFAULT_REGISTRY_URL
    }

    /// Registry API URL describing one released version
    pub fn version_url(&self, version: &str) -> String {
        format!(
            "{}/api/v2/rubygems/{}/versions/{}.json",
            self.registry_url.trim_end_matches('/'),
            self.gem_name,
            version
        )
    }

    /// Path of the built gem for `version`
    pub fn gem_file(&self, version: &str) -> PathBuf {
        self.gem_dir
            .join(format!("{}-{}.gem", self.gem_name, version))
    }
}
