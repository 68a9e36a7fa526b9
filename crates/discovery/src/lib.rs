//! Resolution of the directories a snippet editor saves to and scans.
//!
//! This crate provides mechanisms for:
//! - Expanding `%InstallRoot%`, `%LCID%` and `%MyDocs%` in configured paths.
//! - Reading per-language snippet locations from a hierarchical configuration store.
//! - Merging those locations into a minimal set of directories to scan recursively.
//! - Computing the per-language directories new user snippets are saved to.
//!
//! # Examples
//!
//! ```
//! use snipdirs_discovery::{
//!     MemoryStore, RealFilesystem, ResolverConfig, SnippetDirectories, StaticHost,
//! };
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! let vendor = temp.path().join("vendor");
//! std::fs::create_dir_all(vendor.join("csharp")).unwrap();
//!
//! let mut store = MemoryStore::new();
//! store.set_value(
//!     "Languages\\CodeExpansions\\CSharp\\Paths",
//!     "Vendor",
//!     &format!("{0}/csharp;{0}", vendor.display()),
//! );
//!
//! let host = StaticHost {
//!     ui_locale: Some(1033),
//!     current_locale: 1033,
//!     user_data_root: temp.path().join("docs"),
//!     executable_path: "/opt/ide/bin/ide".into(),
//!     install_dir: "/opt/ide/bin".into(),
//! };
//! let dirs = SnippetDirectories::resolve(&host, &store, &RealFilesystem, &ResolverConfig::default());
//! assert_eq!(dirs.all_snippet_directories().len(), 1);
//! assert_eq!(dirs.user_snippet_directories().len(), 4);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error type for resolution setup.
pub type Error = anyhow::Error;
/// Result type for resolution setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Host collaborators.
pub mod host;
/// Ancestor-free scan directory set.
pub mod merge;
pub mod placeholder;
/// Resolution orchestration and the shared handle.
pub mod resolver;
/// Snippet file enumeration.
pub mod scanner;
pub mod store;
/// Languages and user save directories.
pub mod types;

pub use host::{FixedFilesystem, Filesystem, HostEnvironment, RealFilesystem, StaticHost, SystemHost};
pub use merge::{split_path_list, AncestorRule, MergeOutcome, ScanDirectorySet};
pub use placeholder::{install_root, PlaceholderMap};
pub use resolver::{
    MissingSubsection, PathSource, PieceRecord, ResolutionReport, ResolverConfig, ResolverState,
    SharedSnippetDirectories, SnippetDirectories, ValueRecord,
};
pub use scanner::{discover_snippet_files, SnippetFile};
pub use store::{load_store_file, ConfigStore, MemoryStore, SectionHandle, StoreError};
pub use types::{parse_store_key, Language, UserSnippetDirectories, ROOT_LABEL};
