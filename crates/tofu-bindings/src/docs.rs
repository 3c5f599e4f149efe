//! Post-processing of the generated client documentation.
//!
//! The generator emits one markdown page per model/API under `docs/` with
//! links back to `README.md`. The docs site uses `docs/index.md` as home
//! page instead, so links are rewritten to extension-less page names and
//! every mention of `README` is dropped.

use crate::config::BindingsConfig;
use crate::error::{BindingsError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Summary of a docs rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsRewrite {
    /// Files visited under `docs/`.
    pub files_scanned: usize,
    /// Files whose content changed.
    pub files_changed: usize,
}

/// Rewrite the generated docs in `client_dir` in place.
///
/// 1. `README.md` becomes `docs/index.md`, with `docs/` prefixes removed
/// 2. `Back to README` becomes `Back to HOME` in every page
/// 3. every remaining `README` and `.md` is removed from every page
///
/// Afterwards no file under `docs/` contains `README`.
pub fn rewrite_docs(client_dir: &Path) -> Result<DocsRewrite> {
    let docs_dir = client_dir.join("docs");
    let readme = client_dir.join("README.md");
    if !readme.is_file() {
        return Err(BindingsError::MissingFile(readme));
    }
    std::fs::create_dir_all(&docs_dir)?;

    let index = std::fs::read(&readme)?;
    std::fs::write(docs_dir.join("index.md"), replace_all(&index, b"docs/", b""))?;

    let mut summary = DocsRewrite::default();
    for entry in WalkDir::new(&docs_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        summary.files_scanned += 1;

        let original = std::fs::read(entry.path())?;
        let rewritten = rewrite_page(&original);
        if rewritten != original {
            std::fs::write(entry.path(), &rewritten)?;
            summary.files_changed += 1;
            debug!(file = ?entry.path(), "Rewrote docs page");
        }
    }

    info!(
        scanned = summary.files_scanned,
        changed = summary.files_changed,
        "Rewrote client docs"
    );
    Ok(summary)
}

/// Apply the page substitutions to one file's bytes.
pub fn rewrite_page(content: &[u8]) -> Vec<u8> {
    let mut text = replace_all(content, b"Back to README", b"Back to HOME");

    // Removing one needle can splice together another ("READ.mdME"), so
    // repeat until neither is left.
    loop {
        let next = replace_all(&replace_all(&text, b".md", b""), b"README", b"");
        if next == text {
            return text;
        }
        text = next;
    }
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

/// Site metadata appended to the generator's `mkdocs.yml`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MkdocsSite {
    pub site_name: String,
    pub site_description: String,
    pub site_author: String,
    pub site_url: String,
    pub repo_name: String,
    pub repo_url: String,
    pub theme: String,
}

impl MkdocsSite {
    /// Site metadata for the configured plugin.
    pub fn for_plugin(config: &BindingsConfig) -> Self {
        MkdocsSite {
            site_name: format!("{} Client", capitalize(&config.component)),
            site_description: format!("{} bindings", capitalize(&config.component)),
            site_author: "Pulp Team".to_string(),
            site_url: format!("https://docs.pulpproject.org/{}_client/", config.package),
            repo_name: format!("pulp/{}", config.package),
            repo_url: format!("https://github.com/pulp/{}", config.package),
            theme: "readthedocs".to_string(),
        }
    }

    /// Append this metadata as a new YAML document to `mkdocs.yml`.
    pub fn append_to(&self, mkdocs_yml: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(mkdocs_yml)?;
        write!(file, "---\n{}", yaml)?;
        info!(path = ?mkdocs_yml, site = %self.site_name, "Wrote mkdocs site config");
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
