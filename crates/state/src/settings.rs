use crate::env::{env_path_segment_match, settings_file, store_file};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Store section that lists per-language snippet locations.
pub const DEFAULT_EXPANSIONS_SECTION: &str = "Languages\\CodeExpansions";

/// `ancestor_rule` value selecting substring containment.
pub const SUBSTRING_RULE: &str = "substring";
/// `ancestor_rule` value selecting path-segment boundaries.
pub const PATH_SEGMENT_RULE: &str = "path_segment";

/// Settings parsed from `settings.json`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolverSettings {
    /// Section of the configuration store holding the language keys.
    #[serde(default)]
    pub expansions_section: Option<String>,
    /// How one directory is judged to contain another: `substring` or `path_segment`.
    #[serde(default)]
    pub ancestor_rule: Option<String>,
    /// File backing the configuration store.
    #[serde(default)]
    pub store_file: Option<PathBuf>,
}

impl ResolverSettings {
    /// Returns the expansions section, falling back to [`DEFAULT_EXPANSIONS_SECTION`].
    pub fn expansions_section(&self) -> &str {
        self.expansions_section
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_EXPANSIONS_SECTION)
    }

    /// Applies environment overrides on top of file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(flag) = env_path_segment_match() {
            let rule = if flag { PATH_SEGMENT_RULE } else { SUBSTRING_RULE };
            self.ancestor_rule = Some(rule.to_string());
        }
        if let Some(path) = store_file() {
            self.store_file = Some(path);
        }
        self
    }
}

/// Parses settings from a file; a missing or unparsable file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<ResolverSettings> {
    if !path.exists() {
        return Ok(ResolverSettings::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    Ok(serde_json::from_str::<ResolverSettings>(&text).unwrap_or_default())
}

/// Loads settings from the configured settings file with environment overrides applied.
pub fn load_settings() -> Result<ResolverSettings> {
    let settings = match settings_file() {
        Some(path) => load_settings_from(&path)?,
        None => ResolverSettings::default(),
    };
    Ok(settings.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let settings = load_settings_from(&tmp.path().join("absent.json")).unwrap();
        assert_eq!(settings, ResolverSettings::default());
        assert_eq!(settings.expansions_section(), DEFAULT_EXPANSIONS_SECTION);
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            load_settings_from(&path).unwrap(),
            ResolverSettings::default()
        );
    }

    #[test]
    fn ancestor_rule_key_is_read() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"ancestor_rule": "path_segment"}"#).unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.ancestor_rule.as_deref(), Some(PATH_SEGMENT_RULE));
    }

    #[test]
    fn blank_section_falls_back_to_default() {
        let settings = ResolverSettings {
            expansions_section: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(settings.expansions_section(), DEFAULT_EXPANSIONS_SECTION);
    }
}
