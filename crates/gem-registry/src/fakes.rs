//! In-memory registry fake (testing only)
//!
//! `MemoryGemRegistry` records every push together with the permission bits
//! of the credentials file at the moment of the push.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GemError, Result};
use crate::registry::GemRegistry;

/// One recorded push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    /// Gem file handed to the registry.
    pub gem_file: PathBuf,
    /// Mode of the watched credentials file when the push happened.
    pub credentials_mode: Option<u32>,
}

/// In-memory registry backed by a set of `(gem, version)` pairs.
#[derive(Debug, Default)]
pub struct MemoryGemRegistry {
    released: Mutex<HashSet<(String, String)>>,
    pushes: Mutex<Vec<PushRecord>>,
    lookups: Mutex<Vec<(String, String)>>,
    credentials_path: Option<PathBuf>,
    fail_push: bool,
}

impl MemoryGemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a version as already released.
    pub fn with_release(self, gem: &str, version: &str) -> Self {
        self.released
            .lock()
            .unwrap()
            .insert((gem.to_string(), version.to_string()));
        self
    }

    /// Record the mode of this credentials file on every push.
    pub fn watching_credentials(mut self, path: &Path) -> Self {
        self.credentials_path = Some(path.to_path_buf());
        self
    }

    /// Make every push fail.
    pub fn failing_pushes(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Pushes seen so far.
    pub fn pushes(&self) -> Vec<PushRecord> {
        self.pushes.lock().unwrap().clone()
    }

    /// Version lookups seen so far.
    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl GemRegistry for MemoryGemRegistry {
    async fn has_version(&self, gem: &str, version: &str) -> Result<bool> {
        let key = (gem.to_string(), version.to_string());
        self.lookups.lock().unwrap().push(key.clone());
        Ok(self.released.lock().unwrap().contains(&key))
    }

    async fn push(&self, gem_file: &Path) -> Result<()> {
        let credentials_mode = self.credentials_path.as_deref().and_then(mode_of);
        self.pushes.lock().unwrap().push(PushRecord {
            gem_file: gem_file.to_path_buf(),
            credentials_mode,
        });

        if self.fail_push {
            return Err(GemError::PushFailed("rejected by fake registry".to_string()));
        }
        Ok(())
    }
}

#[cfg(unix)]
fn mode_of(path: &Path) -> Option<u32> {
    crate::credentials::file_mode(path)
}

#[cfg(not(unix))]
fn mode_of(path: &Path) -> Option<u32> {
    path.exists().then_some(0)
}
