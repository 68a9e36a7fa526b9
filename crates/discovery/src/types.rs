use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Folder under the user data root that holds all user snippets.
pub const SNIPPET_DIRECTORY_NAME: &str = "Code Snippets";
/// Personal snippet folder for C# and Visual Basic.
pub const MY_SNIPPETS_DIR: &str = "My Code Snippets";
/// Personal snippet folder for XML.
pub const MY_XML_SNIPPETS_DIR: &str = "My Xml Snippets";
/// Label under which [`UserSnippetDirectories`] stores the snippet root.
pub const ROOT_LABEL: &str = "";

/// A snippet language known to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    /// C# snippets.
    CSharp,
    /// Visual Basic snippets.
    VisualBasic,
    /// XML snippets.
    Xml,
}

impl Language {
    /// All recognized languages.
    pub const ALL: [Language; 3] = [Language::CSharp, Language::VisualBasic, Language::Xml];

    /// Key naming this language in the configuration store.
    pub fn store_key(&self) -> &'static str {
        match self {
            Language::CSharp => "CSharp",
            Language::VisualBasic => "Basic",
            Language::Xml => "XML",
        }
    }

    /// Label shown to users and used as the [`UserSnippetDirectories`] key.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::VisualBasic => "Visual Basic",
            Language::Xml => "XML",
        }
    }

    /// Directory under `Code Snippets` holding this language's snippets.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Language::CSharp => "Visual C#",
            Language::VisualBasic => "Visual Basic",
            Language::Xml => "XML",
        }
    }

    /// Personal folder new snippets are saved to.
    pub fn my_snippets_dir(&self) -> &'static str {
        match self {
            Language::Xml => MY_XML_SNIPPETS_DIR,
            Language::CSharp | Language::VisualBasic => MY_SNIPPETS_DIR,
        }
    }
}

/// Parses a configuration store key into a [`Language`].
///
/// Matching is exact and case-sensitive; any other key is not a snippet language.
///
/// ```
/// use snipdirs_discovery::{parse_store_key, Language};
///
/// assert_eq!(parse_store_key("Basic"), Some(Language::VisualBasic));
/// assert_eq!(parse_store_key("csharp"), None);
/// ```
pub fn parse_store_key(key: &str) -> Option<Language> {
    Language::ALL.into_iter().find(|l| l.store_key() == key)
}

/// Where the current user saves new snippets, keyed by language display name.
///
/// Always holds four entries: one per [`Language`] plus the snippet root under
/// [`ROOT_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSnippetDirectories {
    dirs: BTreeMap<String, PathBuf>,
}

impl UserSnippetDirectories {
    /// Builds the map from an already-resolved user data root.
    pub fn from_user_data_root(user_data_root: &Path) -> Self {
        let snippet_root = user_data_root.join(SNIPPET_DIRECTORY_NAME);
        let mut dirs = BTreeMap::new();
        for lang in Language::ALL {
            dirs.insert(
                lang.display_name().to_string(),
                snippet_root.join(lang.dir_name()).join(lang.my_snippets_dir()),
            );
        }
        dirs.insert(ROOT_LABEL.to_string(), snippet_root);
        Self { dirs }
    }

    /// Looks up a directory by display label.
    pub fn get(&self, label: &str) -> Option<&Path> {
        self.dirs.get(label).map(PathBuf::as_path)
    }

    /// Save directory for `lang`.
    pub fn for_language(&self, lang: Language) -> Option<&Path> {
        self.get(lang.display_name())
    }

    /// The `Code Snippets` root.
    pub fn root(&self) -> Option<&Path> {
        self.get(ROOT_LABEL)
    }

    /// Number of entries; four once built.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// True only for a map built without any entries.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Iterates `(label, path)` pairs; the root label sorts first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.dirs.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn store_keys_round_trip() {
        for lang in Language::ALL {
            assert_eq!(parse_store_key(lang.store_key()), Some(lang));
        }
        assert_eq!(parse_store_key("JScript"), None);
        assert_eq!(parse_store_key("xml"), None);
    }

    #[test]
    fn user_directories_have_four_distinct_entries_under_root() {
        let root = Path::new("/home/dev/Documents/Visual Studio 2008");
        let dirs = UserSnippetDirectories::from_user_data_root(root);

        assert_eq!(dirs.len(), 4);
        let labels: Vec<_> = dirs.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["", "C#", "Visual Basic", "XML"]);

        let distinct: HashSet<_> = dirs.iter().map(|(_, p)| p).collect();
        assert_eq!(distinct.len(), 4);
        assert!(dirs.iter().all(|(_, p)| p.starts_with(root)));
    }

    #[test]
    fn user_directories_follow_fixed_layout() {
        let dirs = UserSnippetDirectories::from_user_data_root(Path::new("/u"));
        assert_eq!(dirs.root(), Some(Path::new("/u/Code Snippets")));
        assert_eq!(
            dirs.for_language(Language::CSharp),
            Some(Path::new("/u/Code Snippets/Visual C#/My Code Snippets"))
        );
        assert_eq!(
            dirs.for_language(Language::VisualBasic),
            Some(Path::new("/u/Code Snippets/Visual Basic/My Code Snippets"))
        );
        assert_eq!(
            dirs.get("XML"),
            Some(Path::new("/u/Code Snippets/XML/My Xml Snippets"))
        );
    }
}
