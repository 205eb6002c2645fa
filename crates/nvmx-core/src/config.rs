use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Error;

pub const DEFAULT_MIRROR_URL: &str = "https://nodejs.org/dist";

/// TTL applied to the remote-catalog cache when none was ever configured.
pub const DEFAULT_REMOTE_CACHE_TTL_MINUTES: i64 = 30;

fn default_mirror_url() -> String {
    DEFAULT_MIRROR_URL.to_string()
}

/// Retention policy for downloaded archives. Advisory only; nothing evicts
/// the cache today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveCachePolicy {
    /// Maximum cache size in MB.
    #[serde(default = "default_cache_max_size")]
    pub max_size: u64,
    /// Archive time-to-live in days.
    #[serde(default = "default_cache_ttl_days")]
    pub ttl: u64,
}

fn default_cache_max_size() -> u64 {
    1024
}

fn default_cache_ttl_days() -> u64 {
    30
}

impl Default for ArchiveCachePolicy {
    fn default() -> Self {
        Self {
            max_size: default_cache_max_size(),
            ttl: default_cache_ttl_days(),
        }
    }
}

/// Cached snapshot of the mirror's published versions.
///
/// `timestamp` is stamped when `versions` is refreshed; `ttl` (minutes) can
/// be changed independently without touching the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVersionsCache {
    pub versions: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub ttl: i64,
}

impl RemoteVersionsCache {
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let ttl = Duration::try_minutes(self.ttl).unwrap_or(Duration::MAX);
        now.signed_duration_since(self.timestamp) < ttl
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// The persisted configuration document (`config.json`).
///
/// Every field is optional on disk; absent fields take the built-in
/// defaults. Version-valued fields stay raw strings here and are parsed at
/// the point of use, so one malformed entry does not invalidate the whole
/// document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_mirror_url")]
    pub mirror_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,

    #[serde(default)]
    pub cache: ArchiveCachePolicy,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_versions_cache: Option<RemoteVersionsCache>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirror_url: default_mirror_url(),
            proxy_url: None,
            default_version: None,
            cache: ArchiveCachePolicy::default(),
            aliases: BTreeMap::new(),
            remote_versions_cache: None,
        }
    }
}

impl Config {
    /// Substitute an alias with its target, or hand the specifier back
    /// untouched when no alias matches.
    #[must_use]
    pub fn resolve_alias<'a>(&'a self, spec: &'a str) -> &'a str {
        self.aliases.get(spec).map_or(spec, String::as_str)
    }
}

/// Handle to the configuration document on disk.
///
/// The document is re-read on every access and every mutation goes through
/// read-merge-write: reload current disk state, apply the change, rewrite
/// the whole file. Two processes writing at once race and the later write
/// wins; no locking is attempted.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the current document, falling back to built-in defaults when the
    /// file is missing, unreadable, or unparsable. Never fails.
    #[must_use]
    pub fn load(&self) -> Config {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(error) => {
                    warn!(
                        "Ignoring unparsable config at {}: {error}",
                        self.path.display()
                    );
                    Config::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", self.path.display());
                Config::default()
            }
            Err(error) => {
                warn!(
                    "Failed to read config at {}: {error}, using defaults",
                    self.path.display()
                );
                Config::default()
            }
        }
    }

    /// Apply a mutation through read-merge-write and persist the result.
    ///
    /// # Errors
    /// Returns `Error::ConfigWrite` when the containing directory cannot be
    /// created or the document cannot be written. Write failures are fatal
    /// to the calling operation.
    pub fn update(&self, mutate: impl FnOnce(&mut Config)) -> Result<(), Error> {
        let mut config = self.load();
        mutate(&mut config);
        self.write(&config)
    }

    fn write(&self, config: &Config) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|error| Error::config_write(self.path.clone(), error))?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|error| Error::config_write(self.path.clone(), error.into()))?;
        std::fs::write(&self.path, content)
            .map_err(|error| Error::config_write(self.path.clone(), error))
    }

    /// # Errors
    /// Propagates configuration write failures.
    pub fn set_mirror_url(&self, url: impl Into<String>) -> Result<(), Error> {
        let url = url.into();
        self.update(|config| config.mirror_url = url)
    }

    /// # Errors
    /// Propagates configuration write failures.
    pub fn set_proxy_url(&self, url: Option<String>) -> Result<(), Error> {
        self.update(|config| config.proxy_url = url)
    }

    /// # Errors
    /// Propagates configuration write failures.
    pub fn set_default_version(&self, version: impl Into<String>) -> Result<(), Error> {
        let version = version.into();
        self.update(|config| config.default_version = Some(version))
    }

    #[must_use]
    pub fn alias(&self, name: &str) -> Option<String> {
        self.load().aliases.get(name).cloned()
    }

    /// # Errors
    /// Propagates configuration write failures.
    pub fn set_alias(&self, name: impl Into<String>, version: impl Into<String>) -> Result<(), Error> {
        let (name, version) = (name.into(), version.into());
        self.update(|config| {
            config.aliases.insert(name, version);
        })
    }

    /// Remove an alias, reporting whether it existed. A missing alias is not
    /// an error and does not touch the file.
    ///
    /// # Errors
    /// Propagates configuration write failures.
    pub fn remove_alias(&self, name: &str) -> Result<bool, Error> {
        let mut config = self.load();
        if config.aliases.remove(name).is_none() {
            return Ok(false);
        }
        self.write(&config)?;
        Ok(true)
    }

    #[must_use]
    pub fn remote_cache(&self) -> Option<RemoteVersionsCache> {
        self.load().remote_versions_cache
    }

    /// Replace the cached catalog, stamping the capture instant and carrying
    /// the previously configured TTL (or the 30-minute default) forward.
    ///
    /// # Errors
    /// Propagates configuration write failures.
    pub fn set_remote_cache_versions(&self, versions: Vec<String>) -> Result<(), Error> {
        self.update(|config| {
            let ttl = config
                .remote_versions_cache
                .as_ref()
                .map_or(DEFAULT_REMOTE_CACHE_TTL_MINUTES, |cache| cache.ttl);
            config.remote_versions_cache = Some(RemoteVersionsCache {
                versions,
                timestamp: Utc::now(),
                ttl,
            });
        })
    }

    /// Change the catalog TTL without refreshing the data. When no envelope
    /// exists yet, an empty one is created to carry the policy until the
    /// first fetch; its epoch timestamp marks it as never refreshed.
    ///
    /// # Errors
    /// Propagates configuration write failures.
    pub fn set_remote_cache_ttl(&self, minutes: i64) -> Result<(), Error> {
        self.update(|config| match config.remote_versions_cache.as_mut() {
            Some(cache) => cache.ttl = minutes,
            None => {
                config.remote_versions_cache = Some(RemoteVersionsCache {
                    versions: Vec::new(),
                    timestamp: DateTime::UNIX_EPOCH,
                    ttl: minutes,
                });
            }
        })
    }
}
