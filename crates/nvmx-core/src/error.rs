use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::FetchError;
use crate::version::{NodeVersion, VersionParseError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UnsupportedHost(#[from] nvmx_platform::HostError),

    #[error("Node.js {version} is not installed")]
    NotInstalled { version: NodeVersion },

    #[error("Failed to uninstall Node.js {version}: {source}")]
    UninstallFailed {
        version: NodeVersion,
        #[source]
        source: std::io::Error,
    },

    #[error("No version specified and no default version set")]
    NoVersionSpecified,

    #[error("Failed to fetch available Node.js versions: {0}")]
    CatalogUnavailable(#[from] FetchError),

    #[error("Failed to install Node.js {version} during {phase}: {details}")]
    InstallFailed {
        version: NodeVersion,
        phase: &'static str,
        details: String,
    },

    #[error("Failed to save configuration to {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Version(#[from] VersionParseError),

    #[error("Invalid version in {}: {source}", path.display())]
    VersionFile {
        path: PathBuf,
        #[source]
        source: VersionParseError,
    },
}

impl Error {
    pub(crate) fn install_failed(
        version: NodeVersion,
        phase: &'static str,
        details: impl Into<String>,
    ) -> Self {
        Self::InstallFailed {
            version,
            phase,
            details: details.into(),
        }
    }

    pub(crate) fn config_write(path: PathBuf, source: std::io::Error) -> Self {
        Self::ConfigWrite { path, source }
    }
}
