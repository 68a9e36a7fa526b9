//! Hierarchical configuration store holding registered snippet locations.

use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Failure to reach a configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The section does not exist.
    #[error("configuration section not found: {0}")]
    NotFound(String),
    /// The section exists but may not be read.
    #[error("access denied to configuration section: {0}")]
    AccessDenied(String),
    /// A store document could not be understood.
    #[error("malformed configuration document: {0}")]
    Malformed(String),
}

/// Opaque reference to an opened section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionHandle {
    path: String,
}

impl SectionHandle {
    /// Handle for the section at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Full `\`-separated path of the section.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of a section nested below this one.
    pub fn join(&self, child: &str) -> String {
        if self.path.is_empty() {
            child.to_string()
        } else {
            format!("{}\\{}", self.path, child)
        }
    }
}

/// Key/value hierarchy the resolver reads snippet locations from.
///
/// Section paths use `\` (or `/`) between segments.
pub trait ConfigStore {
    /// Opens the section at a full path.
    fn open_section(&self, path: &str) -> Result<SectionHandle, StoreError>;

    /// Opens a section relative to `parent`.
    fn open_subsection(
        &self,
        parent: &SectionHandle,
        path: &str,
    ) -> Result<SectionHandle, StoreError> {
        self.open_section(&parent.join(path))
    }

    /// Names of the sections directly below `handle`, in store order.
    fn list_subsection_names(&self, handle: &SectionHandle) -> Vec<String>;

    /// Names of the values stored in `handle`, in store order.
    fn list_value_names(&self, handle: &SectionHandle) -> Vec<String>;

    /// String value `name`; `None` when absent or not a string.
    fn get_value(&self, handle: &SectionHandle, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreValue {
    Text(String),
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section {
    values: BTreeMap<String, StoreValue>,
    children: BTreeMap<String, Section>,
    denied: bool,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['\\', '/']).filter(|s| !s.is_empty())
}

/// In-memory [`ConfigStore`].
///
/// Names are kept sorted, so enumeration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    root: Section,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn section_mut(&mut self, path: &str) -> &mut Section {
        segments(path).fold(&mut self.root, |section, name| {
            section.children.entry(name.to_string()).or_default()
        })
    }

    fn lookup(&self, path: &str) -> Result<&Section, StoreError> {
        let mut section = &self.root;
        for name in segments(path) {
            section = section
                .children
                .get(name)
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            if section.denied {
                return Err(StoreError::AccessDenied(path.to_string()));
            }
        }
        Ok(section)
    }

    /// Creates an empty section (and its parents).
    pub fn create_section(&mut self, path: &str) -> &mut Self {
        self.section_mut(path);
        self
    }

    /// Stores a string value, creating the section if needed.
    pub fn set_value(&mut self, path: &str, name: &str, value: &str) -> &mut Self {
        self.section_mut(path)
            .values
            .insert(name.to_string(), StoreValue::Text(value.to_string()));
        self
    }

    /// Stores a value that is not a string (it reads back as `None`).
    pub fn set_non_string_value(&mut self, path: &str, name: &str) -> &mut Self {
        self.section_mut(path)
            .values
            .insert(name.to_string(), StoreValue::Other);
        self
    }

    /// Marks a section, and everything below it, as unreadable.
    pub fn deny(&mut self, path: &str) -> &mut Self {
        self.section_mut(path).denied = true;
        self
    }

    /// Builds a store from a JSON document.
    ///
    /// Objects become sections, strings become values and any other scalar
    /// becomes a non-string value.
    pub fn from_json_str(text: &str) -> Result<Self, StoreError> {
        let doc: serde_json::Value =
            serde_json::from_str(text).map_err(|e| StoreError::Malformed(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Builds a store from a YAML document with the same shape as [`Self::from_json_str`].
    pub fn from_yaml_str(text: &str) -> Result<Self, StoreError> {
        let doc: serde_json::Value =
            serde_yaml::from_str(text).map_err(|e| StoreError::Malformed(e.to_string()))?;
        Self::from_document(doc)
    }

    fn from_document(doc: serde_json::Value) -> Result<Self, StoreError> {
        match doc {
            serde_json::Value::Object(map) => Ok(Self {
                root: section_from_object(map),
            }),
            serde_json::Value::Null => Ok(Self::default()),
            _ => Err(StoreError::Malformed(
                "top level must be a mapping of sections".into(),
            )),
        }
    }
}

fn section_from_object(map: serde_json::Map<String, serde_json::Value>) -> Section {
    let mut section = Section::default();
    for (name, value) in map {
        match value {
            serde_json::Value::Object(child) => {
                section.children.insert(name, section_from_object(child));
            }
            serde_json::Value::String(text) => {
                section.values.insert(name, StoreValue::Text(text));
            }
            _ => {
                section.values.insert(name, StoreValue::Other);
            }
        }
    }
    section
}

impl ConfigStore for MemoryStore {
    fn open_section(&self, path: &str) -> Result<SectionHandle, StoreError> {
        self.lookup(path)?;
        Ok(SectionHandle::new(segments(path).collect::<Vec<_>>().join("\\")))
    }

    fn list_subsection_names(&self, handle: &SectionHandle) -> Vec<String> {
        self.lookup(handle.path())
            .map(|s| s.children.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn list_value_names(&self, handle: &SectionHandle) -> Vec<String> {
        self.lookup(handle.path())
            .map(|s| s.values.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn get_value(&self, handle: &SectionHandle, name: &str) -> Option<String> {
        match self.lookup(handle.path()).ok()?.values.get(name)? {
            StoreValue::Text(text) => Some(text.clone()),
            StoreValue::Other => None,
        }
    }
}

/// Loads a [`MemoryStore`] from a `.json`, `.yaml` or `.yml` file.
pub fn load_store_file(path: &Path) -> crate::Result<MemoryStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading configuration store {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let store = if is_yaml {
        MemoryStore::from_yaml_str(&text)
    } else {
        MemoryStore::from_json_str(&text)
    };
    store.with_context(|| format!("parsing configuration store {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_section_accepts_either_separator() {
        let mut store = MemoryStore::new();
        store.set_value("Languages\\CodeExpansions\\CSharp\\Paths", "a", "/x");

        let handle = store.open_section("Languages/CodeExpansions").unwrap();
        assert_eq!(handle.path(), "Languages\\CodeExpansions");
        assert_eq!(store.list_subsection_names(&handle), vec!["CSharp"]);

        let paths = store.open_subsection(&handle, "CSharp\\Paths").unwrap();
        assert_eq!(store.list_value_names(&paths), vec!["a"]);
        assert_eq!(store.get_value(&paths, "a").as_deref(), Some("/x"));
        assert_eq!(store.get_value(&paths, "b"), None);
    }

    #[test]
    fn missing_and_denied_sections_are_distinguished() {
        let mut store = MemoryStore::new();
        store.create_section("Open").deny("Locked");
        store.set_value("Locked\\Inner", "v", "x");

        assert!(matches!(
            store.open_section("Missing"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.open_section("Locked\\Inner"),
            Err(StoreError::AccessDenied(_))
        ));
        assert!(store.open_section("Open").is_ok());
    }

    #[test]
    fn non_string_values_read_as_none() {
        let store = MemoryStore::from_json_str(
            r#"{"Paths": {"count": 3, "flag": true, "dir": "/x", "list": ["/a"]}}"#,
        )
        .unwrap();
        let handle = store.open_section("Paths").unwrap();
        assert_eq!(
            store.list_value_names(&handle),
            vec!["count", "dir", "flag", "list"]
        );
        assert_eq!(store.get_value(&handle, "count"), None);
        assert_eq!(store.get_value(&handle, "dir").as_deref(), Some("/x"));
    }

    #[test]
    fn yaml_document_matches_json_shape() {
        let yaml = "Languages:\n  CodeExpansions:\n    XML:\n      Paths:\n        main: /snippets/xml\n";
        let store = MemoryStore::from_yaml_str(yaml).unwrap();
        let handle = store.open_section("Languages\\CodeExpansions\\XML\\Paths").unwrap();
        assert_eq!(
            store.get_value(&handle, "main").as_deref(),
            Some("/snippets/xml")
        );
    }

    #[test]
    fn scalar_document_is_malformed() {
        assert!(matches!(
            MemoryStore::from_json_str("[1, 2]"),
            Err(StoreError::Malformed(_))
        ));
        assert!(matches!(
            MemoryStore::from_json_str("{"),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn load_store_file_picks_format_by_extension() {
        let tmp = tempdir().unwrap();
        let yaml = tmp.path().join("store.yml");
        fs::write(&yaml, "Root:\n  v: a\n").unwrap();
        let json = tmp.path().join("store.json");
        fs::write(&json, r#"{"Root": {"v": "b"}}"#).unwrap();

        for (path, expected) in [(yaml, "a"), (json, "b")] {
            let store = load_store_file(&path).unwrap();
            let handle = store.open_section("Root").unwrap();
            assert_eq!(store.get_value(&handle, "v").as_deref(), Some(expected));
        }
    }

    #[test]
    fn load_store_file_reports_path_on_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        let err = load_store_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
