//! Component version parsing and ordering.
//!
//! Servers report Python-style versions such as `3.44.0`, `3.44.0.dev`,
//! `0.1.0a1.dev` or `3.45.0.post1+deb12`. Ordering follows the release
//! segments first (missing trailing segments count as zero), then the
//! phase, then the post-release number, then the dev marker:
//! `3.44.0.dev < 3.44.0a1 < 3.44.0rc1 < 3.44.0 < 3.44.0.post1.dev < 3.44.0.post1`.
//! A local segment (`+...`) does not take part in comparisons.

use crate::error::{BindingsError, Result};
use std::cmp::Ordering;

/// Release phase of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    /// Development snapshot of the final release (`1.0.dev`).
    Dev,
    Alpha(u64),
    Beta(u64),
    Rc(u64),
    Final,
}

/// A parsed component version.
#[derive(Debug, Clone)]
pub struct ComponentVersion {
    release: Vec<u64>,
    phase: Phase,
    post: Option<u64>,
    dev: Option<u64>,
}

impl ComponentVersion {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let invalid = || BindingsError::InvalidVersion(raw.to_string());

        let public = match raw.split_once('+') {
            Some((public, local)) if !local.is_empty() => public,
            Some(_) => return Err(invalid()),
            None => raw,
        };
        let lowered = public.trim_start_matches(['v', 'V']).to_ascii_lowercase();
        let release_end = lowered
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(lowered.len());
        let release_part = lowered[..release_end].trim_end_matches('.');
        if release_part.is_empty() {
            return Err(invalid());
        }

        let release = release_part
            .split('.')
            .map(|s| s.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        let mut rest = strip_separator(&lowered[release_end..]);
        let mut phase = Phase::Final;

        // Longer spellings first so "alpha" is not read as "a" + "lpha".
        let phases: [(&str, fn(u64) -> Phase); 6] = [
            ("alpha", Phase::Alpha),
            ("beta", Phase::Beta),
            ("rc", Phase::Rc),
            ("a", Phase::Alpha),
            ("b", Phase::Beta),
            ("c", Phase::Rc),
        ];
        for (prefix, make) in phases {
            if let Some(after) = rest.strip_prefix(prefix) {
                let (n, tail) = take_number(after);
                phase = make(n.unwrap_or(0));
                rest = strip_separator(tail);
                break;
            }
        }

        let mut post = None;
        if let Some(after) = rest.strip_prefix("post") {
            let (n, tail) = take_number(after);
            post = Some(n.unwrap_or(0));
            rest = strip_separator(tail);
        }

        let mut dev = None;
        if let Some(after) = rest.strip_prefix("dev") {
            let (n, tail) = take_number(after);
            dev = Some(n.unwrap_or(0));
            rest = tail;
            if phase == Phase::Final && post.is_none() {
                phase = Phase::Dev;
            }
        }

        if !rest.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            release,
            phase,
            post,
            dev,
        })
    }

    fn trimmed_release(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.release[..len]
    }
}

fn strip_separator(s: &str) -> &str {
    s.strip_prefix(['.', '-', '_']).unwrap_or(s)
}

fn take_number(s: &str) -> (Option<u64>, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (s[..end].parse().ok(), &s[end..])
}

impl Ord for ComponentVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.trimmed_release()
            .cmp(other.trimmed_release())
            .then(self.phase.cmp(&other.phase))
            .then(self.post.cmp(&other.post))
            .then(match (self.dev, other.dev) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for ComponentVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ComponentVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComponentVersion {}

/// Pick the version the bindings are published under.
///
/// A build of the exact tag matching the reported version is a release and
/// keeps that version. Anything else is a development build and gets the
/// Unix epoch appended so every upload is unique.
pub fn release_version(reported: &str, git_description: Option<&str>, epoch_secs: i64) -> String {
    let tag = format!("tags/{}", reported);
    match git_description.map(str::trim) {
        Some(description) if description == tag => reported.to_string(),
        _ => format!("{}{}", reported, epoch_secs),
    }
}
