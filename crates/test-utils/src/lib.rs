//! Shared test utilities for snipdirs crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the snipdirs workspace.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = snipdirs_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Snippet host layout inside a temp directory.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// `<tmp>/docs/Visual Studio 2008`, the user data root.
    pub user_data: PathBuf,
    /// `<tmp>/ide`, the installation root.
    pub install_root: PathBuf,
}

impl TestFixture {
    /// Create a new fixture.
    ///
    /// Creates:
    /// - `<tmp>/docs/Visual Studio 2008/`
    /// - `<tmp>/ide/`
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let user_data = tempdir.path().join("docs").join("Visual Studio 2008");
        let install_root = tempdir.path().join("ide");

        std::fs::create_dir_all(&user_data)?;
        std::fs::create_dir_all(&install_root)?;

        Ok(Self {
            tempdir,
            user_data,
            install_root,
        })
    }

    /// Root of the temp environment.
    pub fn root(&self) -> &Path {
        self.tempdir.path()
    }

    /// Create a directory relative to the fixture root and return its path.
    pub fn create_dir(&self, rel: &str) -> std::io::Result<PathBuf> {
        let dir = self.root().join(rel);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Create a `.snippet` file in `dir` (relative to the fixture root).
    pub fn create_snippet(&self, dir: &str, name: &str) -> std::io::Result<PathBuf> {
        let dir = self.create_dir(dir)?;
        let path = dir.join(format!("{name}.snippet"));
        std::fs::write(&path, "<CodeSnippets/>")?;
        Ok(path)
    }
}

/// Render a path as the `String` form used by configuration values.
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
