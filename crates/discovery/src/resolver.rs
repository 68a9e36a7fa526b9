//! Resolution of user save directories and registered snippet scan directories.

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::host::{Filesystem, HostEnvironment, RealFilesystem, SystemHost};
use crate::merge::{split_path_list, AncestorRule, MergeOutcome, ScanDirectorySet};
use crate::placeholder::PlaceholderMap;
use crate::store::{load_store_file, ConfigStore, MemoryStore, SectionHandle};
use crate::types::{parse_store_key, Language, UserSnippetDirectories};
use crate::Result;
use snipdirs_state::{ResolverSettings, DEFAULT_EXPANSIONS_SECTION};

/// Per-language sub-section a configured path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PathSource {
    /// Directories the host creates on first use.
    ForceCreateDirs,
    /// Directories searched for snippets.
    Paths,
}

impl PathSource {
    /// Both sources, in the order they are read for each language.
    pub const ALL: [PathSource; 2] = [PathSource::ForceCreateDirs, PathSource::Paths];

    /// Name of the store sub-section below a language key.
    pub fn subsection_name(&self) -> &'static str {
        match self {
            PathSource::ForceCreateDirs => "ForceCreateDirs",
            PathSource::Paths => "Paths",
        }
    }
}

/// Knobs for a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Store section whose children are the language keys.
    pub expansions_section: String,
    /// Containment test used when merging scan directories.
    pub ancestor_rule: AncestorRule,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            expansions_section: DEFAULT_EXPANSIONS_SECTION.to_string(),
            ancestor_rule: AncestorRule::default(),
        }
    }
}

impl ResolverConfig {
    /// Builds a config from loaded settings.
    ///
    /// An unrecognized `ancestor_rule` is logged and the default rule is used.
    pub fn from_settings(settings: &ResolverSettings) -> Self {
        let ancestor_rule = match settings.ancestor_rule.as_deref() {
            None => AncestorRule::default(),
            Some(name) => AncestorRule::from_name(name).unwrap_or_else(|| {
                warn!(ancestor_rule = name, "Unknown ancestor rule; using substring matching");
                AncestorRule::default()
            }),
        };
        Self {
            expansions_section: settings.expansions_section().to_string(),
            ancestor_rule,
        }
    }
}

/// A sub-section that could not be opened for a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingSubsection {
    /// Language whose key was being read.
    pub language: Language,
    /// Sub-section that could not be opened.
    pub source: PathSource,
    /// Store error text.
    pub error: String,
}

/// One `;`-separated piece of a configured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceRecord {
    /// Piece as configured.
    pub raw: String,
    /// Piece after placeholder expansion.
    pub expanded: String,
    /// What the scan set did with it.
    pub outcome: MergeOutcome,
}

/// One configured value and what became of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueRecord {
    /// Language key the value was read under.
    pub language: Language,
    /// Sub-section holding the value.
    pub source: PathSource,
    /// Value name within the sub-section.
    pub name: String,
    /// `None` when the value was absent or not a string.
    pub raw: Option<String>,
    /// Outcome of each `;`-separated piece.
    pub pieces: Vec<PieceRecord>,
}

/// Diagnostic trail of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Set when the expansions section itself could not be opened.
    pub section_error: Option<String>,
    /// Store keys below the expansions section that are not snippet languages.
    pub ignored_keys: Vec<String>,
    /// Language sub-sections that could not be opened.
    pub missing_subsections: Vec<MissingSubsection>,
    /// Every configured value read, in store order.
    pub values: Vec<ValueRecord>,
}

/// Resolved snippet directories for one host installation.
///
/// Built once by [`SnippetDirectories::resolve`]; immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SnippetDirectories {
    #[serde(skip)]
    placeholders: PlaceholderMap,
    user: UserSnippetDirectories,
    all: ScanDirectorySet,
    report: ResolutionReport,
}

impl SnippetDirectories {
    /// Runs a full resolution pass.
    ///
    /// Never fails: unreachable sections, missing sub-sections and absent
    /// directories only shrink the result and are recorded in [`Self::report`].
    pub fn resolve(
        host: &dyn HostEnvironment,
        store: &dyn ConfigStore,
        fs: &dyn Filesystem,
        config: &ResolverConfig,
    ) -> Self {
        let placeholders = PlaceholderMap::from_host(host);
        let user = UserSnippetDirectories::from_user_data_root(&host.user_data_root());
        let mut pass = Pass {
            store,
            fs,
            placeholders: &placeholders,
            all: ScanDirectorySet::new(config.ancestor_rule),
            report: ResolutionReport::default(),
        };
        pass.scan_expansions(&config.expansions_section);

        let Pass { all, report, .. } = pass;
        debug!(
            directories = all.len(),
            values = report.values.len(),
            missing_subsections = report.missing_subsections.len(),
            "Resolved snippet directories"
        );
        Self {
            placeholders,
            user,
            all,
            report,
        }
    }

    /// Resolves from the process environment, settings file and configured store file.
    ///
    /// Fails only when no user data root can be determined. An unreadable
    /// store file is logged and treated as an empty store.
    pub fn from_environment() -> Result<Self> {
        let host = SystemHost.snapshot()?;
        let settings = snipdirs_state::load_settings().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load resolver settings; using defaults");
            ResolverSettings::default()
        });
        let store = match settings.store_file.as_deref() {
            Some(path) => load_store_file(path).unwrap_or_else(|e| {
                warn!(path = ?path, error = %e, "Failed to load configuration store");
                MemoryStore::new()
            }),
            None => MemoryStore::new(),
        };
        Ok(Self::resolve(
            &host,
            &store,
            &RealFilesystem,
            &ResolverConfig::from_settings(&settings),
        ))
    }

    /// Per-language save directories plus the snippet root.
    pub fn user_snippet_directories(&self) -> &UserSnippetDirectories {
        &self.user
    }

    /// Directories to scan recursively for snippets.
    pub fn all_snippet_directories(&self) -> &ScanDirectorySet {
        &self.all
    }

    /// Token table used to expand configured paths.
    pub fn placeholders(&self) -> &PlaceholderMap {
        &self.placeholders
    }

    /// What happened to every configured value during resolution.
    pub fn report(&self) -> &ResolutionReport {
        &self.report
    }
}

struct Pass<'a> {
    store: &'a dyn ConfigStore,
    fs: &'a dyn Filesystem,
    placeholders: &'a PlaceholderMap,
    all: ScanDirectorySet,
    report: ResolutionReport,
}

impl Pass<'_> {
    fn scan_expansions(&mut self, section: &str) {
        let expansions = match self.store.open_section(section) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(section, error = %e, "Cannot access snippet configuration section");
                self.report.section_error = Some(e.to_string());
                return;
            }
        };

        for key in self.store.list_subsection_names(&expansions) {
            let Some(language) = parse_store_key(&key) else {
                self.report.ignored_keys.push(key);
                continue;
            };
            for source in PathSource::ALL {
                self.scan_subsection(&expansions, &key, language, source);
            }
        }
    }

    fn scan_subsection(
        &mut self,
        expansions: &SectionHandle,
        key: &str,
        language: Language,
        source: PathSource,
    ) {
        let sub = format!("{key}\\{}", source.subsection_name());
        let handle = match self.store.open_subsection(expansions, &sub) {
            Ok(handle) => handle,
            Err(e) => {
                debug!(
                    language = language.display_name(),
                    subsection = source.subsection_name(),
                    error = %e,
                    "Snippet language has no such subsection"
                );
                self.report.missing_subsections.push(MissingSubsection {
                    language,
                    source,
                    error: e.to_string(),
                });
                return;
            }
        };

        for name in self.store.list_value_names(&handle) {
            let raw = self
                .store
                .get_value(&handle, &name)
                .filter(|v| !v.is_empty());
            let pieces = raw
                .as_deref()
                .map(|raw| self.merge_value(raw))
                .unwrap_or_default();
            self.report.values.push(ValueRecord {
                language,
                source,
                name,
                raw,
                pieces,
            });
        }
    }

    fn merge_value(&mut self, raw: &str) -> Vec<PieceRecord> {
        split_path_list(raw)
            .map(|piece| {
                let expanded = self.placeholders.expand(piece);
                let outcome = self.all.try_add(&expanded, self.fs);
                PieceRecord {
                    raw: piece.to_string(),
                    expanded,
                    outcome,
                }
            })
            .collect()
    }
}

/// Lifecycle of a [`SharedSnippetDirectories`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// Nothing has asked for the directories yet.
    Uninitialized,
    /// The single resolution pass is running.
    Initializing,
    /// Directories are resolved and immutable.
    Ready,
}

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

type Builder = Box<dyn Fn() -> SnippetDirectories + Send + Sync>;

/// Handle that resolves [`SnippetDirectories`] on first access, exactly once.
///
/// Concurrent first accesses block until the single resolution finishes.
/// Create one at startup and pass it to every consumer.
pub struct SharedSnippetDirectories {
    builder: Builder,
    cell: OnceLock<SnippetDirectories>,
    state: AtomicU8,
}

impl SharedSnippetDirectories {
    /// Handle that runs `builder` on first access.
    pub fn new(builder: impl Fn() -> SnippetDirectories + Send + Sync + 'static) -> Self {
        Self {
            builder: Box::new(builder),
            cell: OnceLock::new(),
            state: AtomicU8::new(UNINITIALIZED),
        }
    }

    /// Handle that resolves via [`SnippetDirectories::from_environment`].
    ///
    /// When the environment yields no user data root, resolution proceeds
    /// against an empty store with the temp-directory fallback root, so
    /// accessors still succeed and every save directory is absolute.
    pub fn from_environment() -> Self {
        Self::new(|| {
            SnippetDirectories::from_environment().unwrap_or_else(|e| {
                warn!(error = %e, "Cannot resolve host environment; snippet directories will be empty");
                SnippetDirectories::resolve(
                    &SystemHost,
                    &MemoryStore::new(),
                    &RealFilesystem,
                    &ResolverConfig::default(),
                )
            })
        })
    }

    /// Resolved directories, resolving on first call.
    pub fn get(&self) -> &SnippetDirectories {
        self.cell.get_or_init(|| {
            self.state.store(INITIALIZING, Ordering::Release);
            let dirs = (self.builder)();
            self.state.store(READY, Ordering::Release);
            dirs
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ResolverState {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => ResolverState::Uninitialized,
            INITIALIZING => ResolverState::Initializing,
            _ => ResolverState::Ready,
        }
    }

    /// Per-language save directories, resolving on first call.
    pub fn user_snippet_directories(&self) -> &UserSnippetDirectories {
        self.get().user_snippet_directories()
    }

    /// Directories to scan recursively, resolving on first call.
    pub fn all_snippet_directories(&self) -> &ScanDirectorySet {
        self.get().all_snippet_directories()
    }
}

impl std::fmt::Debug for SharedSnippetDirectories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSnippetDirectories")
            .field("state", &self.state())
            .field("resolved", &self.cell.get())
            .finish()
    }
}
