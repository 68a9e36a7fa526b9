//! `%Token%` expansion for configured snippet paths.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::host::HostEnvironment;

/// Installation root token.
pub const INSTALL_ROOT_TOKEN: &str = "%InstallRoot%";
/// UI locale id token.
pub const LCID_TOKEN: &str = "%LCID%";
/// User data root token.
pub const MY_DOCS_TOKEN: &str = "%MyDocs%";

/// Immutable token -> value table used to expand configured paths.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    values: BTreeMap<String, String>,
    /// Alternation of every bound token; `None` when nothing is bound.
    pattern: Option<Regex>,
}

impl PlaceholderMap {
    /// Builds a map from explicit `(token, value)` pairs.
    ///
    /// Empty tokens are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        // Longest first, so a token never loses to one of its own prefixes.
        let mut tokens: Vec<&str> = values.keys().map(String::as_str).collect();
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let pattern = (!tokens.is_empty()).then(|| {
            let alternation = tokens
                .iter()
                .map(|t| format!("({})", regex::escape(t)))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&alternation).expect("escaped literal alternation is a valid regex")
        });

        Self { values, pattern }
    }

    /// Builds the three host tokens from the host environment.
    ///
    /// A token whose value cannot be determined (empty user data root, or no
    /// executable path and no install directory) stays unbound, so paths
    /// using it keep the literal token and fail the existence check.
    pub fn from_host(host: &dyn HostEnvironment) -> Self {
        let lcid = host.ui_locale().unwrap_or_else(|| host.current_locale());
        let executable = host.executable_path();
        let install_dir = host.install_dir();
        let user_data_root = host.user_data_root();

        let mut pairs = vec![(LCID_TOKEN, lcid.to_string())];
        if !(executable.as_os_str().is_empty() && install_dir.as_os_str().is_empty()) {
            let root = install_root(&executable, &install_dir);
            pairs.push((INSTALL_ROOT_TOKEN, root.to_string_lossy().into_owned()));
        }
        if !user_data_root.as_os_str().is_empty() {
            pairs.push((MY_DOCS_TOKEN, user_data_root.to_string_lossy().into_owned()));
        }
        Self::from_pairs(pairs)
    }

    /// Value bound to `token`, if any.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Replaces every occurrence of every known token in `raw`.
    ///
    /// Matching is literal and case-sensitive. Unknown tokens are copied
    /// through untouched and substituted values are not rescanned.
    ///
    /// ```
    /// use snipdirs_discovery::PlaceholderMap;
    ///
    /// let map = PlaceholderMap::from_pairs([("%InstallRoot%", r"C:\VS")]);
    /// assert_eq!(map.expand(r"%InstallRoot%\Snippets"), r"C:\VS\Snippets");
    /// assert_eq!(map.expand(r"%Foo%\Snippets"), r"%Foo%\Snippets");
    /// ```
    pub fn expand(&self, raw: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return raw.to_string();
        };
        pattern
            .replace_all(raw, |caps: &Captures<'_>| {
                let token = &caps[0];
                self.values
                    .get(token)
                    .cloned()
                    .unwrap_or_else(|| token.to_string())
            })
            .into_owned()
    }
}

/// Derives the installation root from the host executable path.
///
/// Keeps the path root plus the first two components below it, e.g.
/// `/opt/ide/Common7/IDE/devenv` becomes `/opt/ide`. Shorter paths fall back
/// to two levels above `install_dir`.
pub fn install_root(executable_path: &Path, install_dir: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    let mut normal = Vec::with_capacity(2);
    for component in executable_path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir if normal.is_empty() => {
                root.push(component.as_os_str());
            }
            Component::Normal(part) => {
                normal.push(part);
                if normal.len() == 2 {
                    break;
                }
            }
            _ => {}
        }
    }
    if normal.len() < 2 {
        return install_dir.join("..").join("..");
    }
    for part in normal {
        root.push(part);
    }
    root
}
