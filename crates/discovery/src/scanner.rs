use pathdiff::diff_paths;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Extension of snippet files.
pub const SNIPPET_EXTENSION: &str = "snippet";

/// A snippet file found below a scan directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetFile {
    /// Path relative to `root`, using `/` separators.
    pub name: String,
    /// Full path to the `.snippet` file.
    pub path: PathBuf,
    /// Scan directory the file was found under.
    pub root: PathBuf,
}

fn is_snippet_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(SNIPPET_EXTENSION))
}

/// Lists `*.snippet` files below each directory, recursively.
///
/// File contents are not read. Traversal errors are logged and skipped, and
/// each root is walked in file-name order.
pub fn discover_snippet_files<I, P>(roots: I) -> Vec<SnippetFile>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut files = Vec::new();
    for root in roots {
        let root = root.as_ref();
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        path = ?e.path(),
                        error = %e,
                        "Failed to read directory entry while scanning snippets"
                    );
                    continue;
                }
            };
            if !is_snippet_file(&entry) {
                continue;
            }
            let path = entry.into_path();
            let name = diff_paths(&path, root)
                .map(|p| {
                    p.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            files.push(SnippetFile {
                name,
                path,
                root: root.to_path_buf(),
            });
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_nested_snippets_only() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("snippets");
        fs::create_dir_all(root.join("refactor/deep")).unwrap();
        fs::write(root.join("prop.snippet"), "<CodeSnippets/>").unwrap();
        fs::write(root.join("refactor/deep/Ctor.SNIPPET"), "<CodeSnippets/>").unwrap();
        fs::write(root.join("refactor/readme.txt"), "x").unwrap();
        fs::create_dir_all(root.join("dir.snippet")).unwrap();

        let files = discover_snippet_files([&root]);
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["prop.snippet", "refactor/deep/Ctor.SNIPPET"]);
        assert!(files.iter().all(|f| f.root == root));
    }

    #[test]
    fn missing_roots_are_skipped() {
        let tmp = tempdir().unwrap();
        let files = discover_snippet_files([tmp.path().join("absent")]);
        assert!(files.is_empty());
    }
}
