//! Core logic for nvmx, a Node.js version manager: resolving raw version
//! specifiers to concrete runtimes, caching the distribution mirror's
//! published-version catalog, and installing and uninstalling runtimes in
//! the local version store.
//!
//! Everything is wired through an explicit [`ConfigStore`] handle rather
//! than process-global state; the CLI builds one per invocation and passes
//! it into the resolver, the catalog, and the installer.

mod catalog;
mod config;
mod error;
mod installer;
mod resolver;
mod runtime;
mod store;
mod version;

/// Remote catalog access and the mirror index row shapes.
pub use catalog::{FetchError, LtsField, RemoteCatalog, RemoteIndexEntry};
/// The persisted configuration document and its on-disk store handle.
pub use config::{
    ArchiveCachePolicy, Config, ConfigStore, DEFAULT_MIRROR_URL,
    DEFAULT_REMOTE_CACHE_TTL_MINUTES, RemoteVersionsCache,
};
pub use error::Error;
pub use installer::{InstallOutcome, Installer};
/// Specifier resolution and project version-file discovery.
pub use resolver::{VERSION_FILE_NAMES, VersionResolver, find_version_file};
pub use runtime::active_version;
pub use store::VersionStore;
pub use version::{NodeVersion, VersionParseError};
