//! Minimal covering set of snippet scan directories.
//!
//! Scan directories are walked recursively later on, so the set only keeps the
//! most general entry of any ancestor/descendant pair.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::host::Filesystem;

/// Separator between paths in a single configured value.
pub const PATH_LIST_SEPARATOR: char = ';';

/// How one directory is judged to contain another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestorRule {
    /// `a` covers `b` when `a` occurs anywhere inside `b` as a substring.
    ///
    /// `/data` therefore covers `/database`.
    #[default]
    Substring,
    /// `a` covers `b` when `b` equals `a` or continues it after a separator.
    PathSegment,
}

impl AncestorRule {
    /// Parses a settings name such as `substring` or `path_segment`.
    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(name.trim().to_string())).ok()
    }

    /// Returns true when a recursive scan of `ancestor` also reaches `descendant`.
    pub fn covers(&self, ancestor: &str, descendant: &str) -> bool {
        match self {
            AncestorRule::Substring => descendant.contains(ancestor),
            AncestorRule::PathSegment => match descendant.strip_prefix(ancestor) {
                Some("") => true,
                Some(rest) => ancestor.ends_with(is_separator) || rest.starts_with(is_separator),
                None => false,
            },
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Splits a configured value into its individual, non-empty paths.
pub fn split_path_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(PATH_LIST_SEPARATOR).filter(|p| !p.is_empty())
}

/// Result of offering one candidate to a [`ScanDirectorySet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MergeOutcome {
    /// Already present verbatim.
    Duplicate,
    /// Not an existing directory.
    Missing,
    /// An existing entry already covers the candidate.
    Covered {
        /// Entry that covers the candidate.
        by: String,
    },
    /// Appended, after dropping the entries it covers.
    Added {
        /// Entries dropped in favor of the candidate.
        replaced: Vec<String>,
    },
}

impl MergeOutcome {
    /// True when the candidate ended up in the set.
    pub fn is_added(&self) -> bool {
        matches!(self, MergeOutcome::Added { .. })
    }
}

/// Ordered, ancestor-free set of directories to scan for snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanDirectorySet {
    entries: Vec<String>,
    #[serde(skip)]
    rule: AncestorRule,
}

impl ScanDirectorySet {
    /// Empty set using `rule` for containment.
    pub fn new(rule: AncestorRule) -> Self {
        Self {
            entries: Vec::new(),
            rule,
        }
    }

    /// Containment rule in effect.
    pub fn rule(&self) -> AncestorRule {
        self.rule
    }

    /// Offers `candidate` to the set.
    ///
    /// Verbatim duplicates and paths that are not directories are ignored.
    /// Entries the candidate covers are dropped (unless they equal it
    /// ignoring case), and the candidate is appended unless a remaining entry
    /// covers it.
    pub fn try_add(&mut self, candidate: &str, fs: &dyn Filesystem) -> MergeOutcome {
        if self.contains(candidate) {
            return MergeOutcome::Duplicate;
        }
        if !fs.is_dir(candidate) {
            debug!(path = candidate, "Skipping snippet directory that does not exist");
            return MergeOutcome::Missing;
        }

        let rule = self.rule;
        let replaced: Vec<String> = self
            .entries
            .iter()
            .filter(|existing| {
                rule.covers(candidate, existing) && !eq_ignore_case(candidate, existing)
            })
            .cloned()
            .collect();
        self.entries.retain(|existing| !replaced.contains(existing));

        if let Some(by) = self
            .entries
            .iter()
            .find(|existing| rule.covers(existing, candidate))
        {
            debug!(path = candidate, covered_by = %by, "Snippet directory already covered");
            return MergeOutcome::Covered { by: by.clone() };
        }

        if !replaced.is_empty() {
            debug!(path = candidate, replaced = ?replaced, "Snippet directory generalizes existing entries");
        }
        self.entries.push(candidate.to_string());
        MergeOutcome::Added { replaced }
    }

    /// True when `path` is an entry, compared verbatim.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e == path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no directory has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// Entries as strings, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Entries as paths, in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(Path::new)
    }
}
