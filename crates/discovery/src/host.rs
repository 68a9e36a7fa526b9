//! Host collaborators consumed during resolution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::Result;

/// Facts about the hosting IDE installation.
pub trait HostEnvironment {
    /// UI locale id chosen by the host, or `None` when it does not override it.
    fn ui_locale(&self) -> Option<u32>;
    /// Locale id of the current process culture.
    fn current_locale(&self) -> u32;
    /// Absolute path of the per-user data root.
    fn user_data_root(&self) -> PathBuf;
    /// Full path of the host executable.
    fn executable_path(&self) -> PathBuf;
    /// Host installation directory.
    fn install_dir(&self) -> PathBuf;
}

/// Directory existence checks.
pub trait Filesystem {
    /// True when `path` names an existing directory.
    fn is_dir(&self, path: &str) -> bool;
}

/// [`Filesystem`] backed by the real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn is_dir(&self, path: &str) -> bool {
        !path.is_empty() && Path::new(path).is_dir()
    }
}

/// [`Filesystem`] that reports a fixed list of directories.
#[derive(Debug, Clone, Default)]
pub struct FixedFilesystem {
    dirs: HashSet<String>,
}

impl FixedFilesystem {
    /// Filesystem where exactly `dirs` exist.
    pub fn new<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filesystem for FixedFilesystem {
    fn is_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }
}

/// [`HostEnvironment`] with every value supplied up front.
#[derive(Debug, Clone)]
pub struct StaticHost {
    /// See [`HostEnvironment::ui_locale`].
    pub ui_locale: Option<u32>,
    /// See [`HostEnvironment::current_locale`].
    pub current_locale: u32,
    /// See [`HostEnvironment::user_data_root`].
    pub user_data_root: PathBuf,
    /// See [`HostEnvironment::executable_path`].
    pub executable_path: PathBuf,
    /// See [`HostEnvironment::install_dir`].
    pub install_dir: PathBuf,
}

impl HostEnvironment for StaticHost {
    fn ui_locale(&self) -> Option<u32> {
        self.ui_locale
    }

    fn current_locale(&self) -> u32 {
        self.current_locale
    }

    fn user_data_root(&self) -> PathBuf {
        self.user_data_root.clone()
    }

    fn executable_path(&self) -> PathBuf {
        self.executable_path.clone()
    }

    fn install_dir(&self) -> PathBuf {
        self.install_dir.clone()
    }
}

/// [`HostEnvironment`] read from the process environment.
///
/// See `snipdirs_state::env` for the variables consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    /// Snapshots the current environment into a [`StaticHost`].
    ///
    /// Fails only when no user data root can be determined.
    pub fn snapshot(&self) -> Result<StaticHost> {
        let executable_path = snipdirs_state::executable_path().unwrap_or_default();
        let install_dir = snipdirs_state::install_dir().unwrap_or_default();
        Ok(StaticHost {
            ui_locale: snipdirs_state::env_ui_locale(),
            current_locale: snipdirs_state::current_locale(),
            user_data_root: snipdirs_state::user_data_root()?,
            executable_path,
            install_dir,
        })
    }
}

impl HostEnvironment for SystemHost {
    fn ui_locale(&self) -> Option<u32> {
        snipdirs_state::env_ui_locale()
    }

    fn current_locale(&self) -> u32 {
        snipdirs_state::current_locale()
    }

    fn user_data_root(&self) -> PathBuf {
        snipdirs_state::user_data_root().unwrap_or_else(|e| {
            let fallback = snipdirs_state::fallback_user_data_root();
            warn!(error = %e, fallback = ?fallback, "Cannot determine user data root");
            fallback
        })
    }

    fn executable_path(&self) -> PathBuf {
        snipdirs_state::executable_path().unwrap_or_default()
    }

    fn install_dir(&self) -> PathBuf {
        snipdirs_state::install_dir().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipdirs_test_utils::{env_guard, set_env_var};
    use tempfile::tempdir;

    #[test]
    fn real_filesystem_only_accepts_directories() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let fs = RealFilesystem;
        assert!(fs.is_dir(tmp.path().to_str().unwrap()));
        assert!(!fs.is_dir(file.to_str().unwrap()));
        assert!(!fs.is_dir(tmp.path().join("missing").to_str().unwrap()));
        assert!(!fs.is_dir(""));
    }

    #[test]
    fn system_host_reads_environment() {
        let _g = env_guard();
        let _data = set_env_var("SNIPDIRS_USER_DATA", Some("/srv/u"));
        let _lcid = set_env_var("SNIPDIRS_LCID", Some("1041"));
        let _exe = set_env_var("SNIPDIRS_EXECUTABLE", Some("/opt/vs/Common7/IDE/devenv"));
        let _dir = set_env_var("SNIPDIRS_INSTALL_DIR", None);

        let host = SystemHost.snapshot().unwrap();
        assert_eq!(host.ui_locale, Some(1041));
        assert_eq!(host.user_data_root, PathBuf::from("/srv/u"));
        assert_eq!(host.install_dir, PathBuf::from("/opt/vs/Common7/IDE"));
    }
}
