//! Locating built distributions in `dist/`.

use crate::error::{BindingsError, Result};
use std::path::{Path, PathBuf};

/// Built distributions of the client package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distributions {
    /// Universal py3 wheels.
    pub wheels: Vec<PathBuf>,
    /// Source tarballs.
    pub sdists: Vec<PathBuf>,
}

impl Distributions {
    /// Every artifact, wheels first.
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.wheels.iter().chain(self.sdists.iter())
    }
}

/// Find the wheel and sdist for `package` in `dist_dir`.
///
/// setuptools names the sdist `<package>-client-*` or `<package>_client-*`
/// depending on its version; both are accepted. At least one of each kind
/// must exist.
pub fn find_distributions(dist_dir: &Path, package: &str) -> Result<Distributions> {
    let wheel_prefix = format!("{}_client-", package);
    let sdist_prefixes = [format!("{}-client-", package), format!("{}_client-", package)];

    let mut wheels = Vec::new();
    let mut sdists = Vec::new();

    for entry in std::fs::read_dir(dist_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with(&wheel_prefix) && name.ends_with("-py3-none-any.whl") {
            wheels.push(entry.path());
        } else if name.ends_with(".tar.gz") && sdist_prefixes.iter().any(|p| name.starts_with(p))
        {
            sdists.push(entry.path());
        }
    }

    wheels.sort();
    sdists.sort();

    if wheels.is_empty() {
        return Err(BindingsError::MissingArtifact {
            dir: dist_dir.to_path_buf(),
            pattern: format!("{}*-py3-none-any.whl", wheel_prefix),
        });
    }
    if sdists.is_empty() {
        return Err(BindingsError::MissingArtifact {
            dir: dist_dir.to_path_buf(),
            pattern: format!("{}*.tar.gz", sdist_prefixes[0]),
        });
    }

    Ok(Distributions { wheels, sdists })
}
