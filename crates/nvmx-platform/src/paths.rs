use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the nvmx home directory.
pub const NVMX_HOME_ENV: &str = "NVMX_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NvmxPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
}

/// Directory layout under the nvmx home: `versions/` holds one tree per
/// installed runtime, `cache/` holds downloaded archives, and `config.json`
/// is the persisted configuration document.
#[derive(Debug, Clone)]
pub struct NvmxPaths {
    home: PathBuf,
}

impl NvmxPaths {
    /// Resolve the nvmx home, honoring the `NVMX_HOME` environment variable
    /// and falling back to `~/.nvmx`.
    ///
    /// # Errors
    /// Returns an error when no override is set and the user home directory
    /// cannot be determined.
    pub fn new() -> Result<Self, NvmxPathsError> {
        if let Some(home) = std::env::var_os(NVMX_HOME_ENV)
            && !home.is_empty()
        {
            return Ok(Self { home: home.into() });
        }

        let home = dirs::home_dir().ok_or(NvmxPathsError::HomeDirUnavailable)?;
        Ok(Self {
            home: home.join(".nvmx"),
        })
    }

    /// Layout rooted at an explicit directory, bypassing environment lookup.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    #[must_use]
    pub fn versions_dir(&self) -> PathBuf {
        self.home.join("versions")
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.home.join("cache")
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.json")
    }

    /// Destination directory for one installed version, named by its
    /// canonical `v`-prefixed form.
    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions_dir().join(version)
    }

    /// Ensure the home, version store, and download cache exist on disk.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.home)?;
        std::fs::create_dir_all(self.versions_dir())?;
        std::fs::create_dir_all(self.cache_dir())?;
        Ok(())
    }
}
