//! RubyGems credentials file
//!
//! `gem push` reads the API key from `~/.gem/credentials`. The key is written
//! as a symbol-keyed YAML mapping, which is what RubyGems looks up; a quoted
//! key would be read as a plain string and ignored.

use crate::error::{GemError, Result};
use directories::BaseDirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Permission bits of the credentials file (owner read/write).
pub const CREDENTIALS_MODE: u32 = 0o600;

/// Default credentials location, `~/.gem/credentials`.
pub fn default_credentials_path() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".gem").join("credentials"))
        .ok_or(GemError::HomeDirUnavailable)
}

/// Render the credentials file content.
pub fn render_credentials(api_key: &str) -> String {
    format!("---\n:rubygems_api_key: {}\n", api_key.trim())
}

/// Write the credentials file, readable by the owner only.
///
/// The file is created with restricted permissions and re-restricted if it
/// already existed, so the key is never readable by other users.
pub fn write_credentials(path: &Path, api_key: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CREDENTIALS_MODE);
    }

    let mut file = options.open(path)?;
    restrict_permissions(path)?;
    file.write_all(render_credentials(api_key).as_bytes())?;
    file.sync_all()?;

    info!(path = ?path, "Wrote gem credentials");
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(CREDENTIALS_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Permission bits of `path`, if it exists.
#[cfg(unix)]
pub fn file_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .ok()
        .map(|m| m.permissions().mode() & 0o777)
}
