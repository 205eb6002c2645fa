use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::Error;
use crate::version::NodeVersion;

/// Relative path of the runtime executable inside an installed version.
/// A version directory missing this file does not count as installed,
/// whatever else it contains.
const NODE_EXECUTABLE: &str = "bin/node";

/// The set of installed runtimes, derived entirely from directory and file
/// presence under the store root. There is no manifest to drift out of
/// sync; the filesystem is the record.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
}

impl VersionStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the version is (or would be) installed into.
    #[must_use]
    pub fn version_dir(&self, version: NodeVersion) -> PathBuf {
        self.root.join(version.to_string())
    }

    /// Whether `version` is fully installed: its directory exists and holds
    /// the runtime executable. A directory left behind by an interrupted
    /// install fails the executable check and reads as not installed.
    #[must_use]
    pub fn is_installed(&self, version: NodeVersion) -> bool {
        let dir = self.version_dir(version);
        dir.is_dir() && dir.join(NODE_EXECUTABLE).is_file()
    }

    /// All installed versions, newest first.
    ///
    /// A missing store root means nothing is installed. Unreadable entries
    /// are skipped with a warning rather than failing the whole listing.
    #[must_use]
    pub fn list_installed(&self) -> Vec<NodeVersion> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                warn!("Failed to read version store {}: {error}", self.root.display());
                return Vec::new();
            }
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!("Skipping unreadable version store entry: {error}");
                    continue;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Ok(version) = name.parse::<NodeVersion>() else {
                debug!("Ignoring non-version entry {name} in version store");
                continue;
            };

            if self.is_installed(version) {
                versions.push(version);
            }
        }

        versions.sort_unstable_by(|a, b| b.cmp(a));
        versions
    }

    /// Delete an installed version's directory tree.
    ///
    /// # Errors
    /// Returns [`Error::NotInstalled`] when the version fails the installed
    /// check, and [`Error::UninstallFailed`] when the tree cannot be
    /// removed. A path that vanishes mid-removal is not an error.
    pub fn remove(&self, version: NodeVersion) -> Result<(), Error> {
        if !self.is_installed(version) {
            return Err(Error::NotInstalled { version });
        }

        match std::fs::remove_dir_all(self.version_dir(version)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::UninstallFailed { version, source }),
        }
    }
}
