//! Tar archives of build outputs.

use crate::error::{BindingsError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// A written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutput {
    /// Archive location.
    pub path: PathBuf,
    /// Top-level directory name inside the archive.
    pub root: String,
    /// SHA-256 of the archive file, hex encoded.
    pub sha256: String,
}

/// Pack `src_dir` into an uncompressed tar at `dest`, rooted at `root`.
///
/// Entries are stored as `<root>/...` regardless of where `src_dir` lives.
pub fn create_archive(src_dir: &Path, root: &str, dest: &Path) -> Result<ArchiveOutput> {
    if !src_dir.is_dir() {
        return Err(BindingsError::MissingFile(src_dir.to_path_buf()));
    }
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = BufWriter::new(File::create(dest)?);
    let mut tar = tar::Builder::new(file);
    tar.follow_symlinks(false);
    tar.append_dir_all(root, src_dir)?;
    tar.into_inner()?.flush()?;

    let sha256 = file_sha256(dest)?;
    info!(archive = ?dest, root = %root, sha256 = %sha256, "Wrote archive");

    Ok(ArchiveOutput {
        path: dest.to_path_buf(),
        root: root.to_string(),
        sha256,
    })
}

/// Same as [`create_archive`], off the async runtime.
pub async fn create_archive_blocking(
    src_dir: PathBuf,
    root: String,
    dest: PathBuf,
) -> Result<ArchiveOutput> {
    tokio::task::spawn_blocking(move || create_archive(&src_dir, &root, &dest)).await?
}

/// Hex SHA-256 of a file's content.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Names of all entries in a tar file.
pub fn list_entries(path: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = tar::Archive::new(File::open(path)?);
    let mut names = Vec::new();
    for entry in archive.entries()? {
        names.push(entry?.path()?.into_owned());
    }
    Ok(names)
}
