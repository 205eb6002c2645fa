use log::{debug, info, warn};
use serde::Deserialize;

use crate::config::{Config, ConfigStore};
use crate::error::Error;
use crate::version::NodeVersion;

/// Why a catalog fetch produced no usable version list.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid proxy URL {url}: {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("mirror returned HTTP {status} for {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("failed to parse mirror index: {0}")]
    Parse(#[source] reqwest::Error),

    #[error("mirror index contained no usable versions")]
    EmptyIndex,
}

/// The `lts` field of an index entry: `false` on current releases, a
/// codename string on LTS ones.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LtsField {
    Codename(String),
    Flag(bool),
}

impl Default for LtsField {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl LtsField {
    #[must_use]
    pub fn codename(&self) -> Option<&str> {
        match self {
            Self::Codename(name) => Some(name),
            Self::Flag(_) => None,
        }
    }
}

/// One release row of the mirror's `index.json`. Fields beyond the version
/// and the LTS tag are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIndexEntry {
    pub version: String,
    #[serde(default)]
    pub lts: LtsField,
}

/// A usable catalog row: the parsed version plus its LTS codename.
#[derive(Debug, Clone)]
struct CatalogRow {
    version: NodeVersion,
    lts_codename: Option<String>,
}

/// What a catalog read produced: fresh rows straight from the mirror, with
/// LTS tags, or version strings replayed from the persisted envelope.
enum CatalogData {
    Fresh(Vec<CatalogRow>),
    Cached(Vec<String>),
}

/// The mirror's published-version list, read through the TTL'd cache
/// envelope in the configuration document.
///
/// Reads prefer a valid cache; fetches persist a fresh envelope; fetch
/// failures fall back to whatever envelope exists, however stale, because a
/// dated version list is strictly more useful than none.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    store: ConfigStore,
}

impl RemoteCatalog {
    #[must_use]
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Published versions, newest first.
    ///
    /// # Errors
    /// Returns [`Error::CatalogUnavailable`] when the fetch fails and no
    /// cached catalog exists, and [`Error::ConfigWrite`] when a fetched
    /// catalog cannot be persisted.
    pub async fn versions(&self, force_refresh: bool) -> Result<Vec<String>, Error> {
        Ok(match self.load(force_refresh).await? {
            CatalogData::Fresh(rows) => rows.iter().map(|row| row.version.to_string()).collect(),
            CatalogData::Cached(versions) => versions,
        })
    }

    /// The newest LTS release, for installs that name no version at all.
    ///
    /// Only a fetched index carries LTS tags; when the cache answers, the
    /// newest cached version stands in for the pick.
    ///
    /// # Errors
    /// Same failure modes as [`versions`](Self::versions).
    pub async fn latest_lts(&self) -> Result<NodeVersion, Error> {
        match self.load(false).await? {
            CatalogData::Fresh(rows) => {
                let pick = rows
                    .iter()
                    .find(|row| row.lts_codename.is_some())
                    .or_else(|| rows.first());
                match pick {
                    Some(row) => {
                        if let Some(codename) = &row.lts_codename {
                            debug!("Latest LTS release is {} ({codename})", row.version);
                        }
                        Ok(row.version)
                    }
                    None => Err(Error::CatalogUnavailable(FetchError::EmptyIndex)),
                }
            }
            CatalogData::Cached(versions) => match versions.first() {
                Some(newest) => newest.parse().map_err(Error::from),
                None => Err(Error::CatalogUnavailable(FetchError::EmptyIndex)),
            },
        }
    }

    async fn load(&self, force_refresh: bool) -> Result<CatalogData, Error> {
        let config = self.store.load();

        if !force_refresh
            && let Some(cache) = &config.remote_versions_cache
            && cache.is_valid()
            && !cache.versions.is_empty()
        {
            debug!("Serving {} catalog versions from cache", cache.versions.len());
            return Ok(CatalogData::Cached(cache.versions.clone()));
        }

        info!(
            "Fetching available Node.js versions from {}",
            config.mirror_url
        );
        let fetched = fetch_index(&config).await.and_then(|raw| {
            let rows = parse_rows(raw);
            if rows.is_empty() {
                Err(FetchError::EmptyIndex)
            } else {
                Ok(rows)
            }
        });

        match fetched {
            Ok(rows) => {
                let versions: Vec<String> =
                    rows.iter().map(|row| row.version.to_string()).collect();
                self.store.set_remote_cache_versions(versions)?;
                Ok(CatalogData::Fresh(rows))
            }
            Err(error) => match config.remote_versions_cache {
                Some(cache) if !cache.versions.is_empty() => {
                    warn!(
                        "Failed to fetch from remote, using cached versions (may be outdated): {error}"
                    );
                    Ok(CatalogData::Cached(cache.versions))
                }
                _ => Err(Error::CatalogUnavailable(error)),
            },
        }
    }
}

/// Identifier sent with every request to the mirror.
pub(crate) const USER_AGENT: &str = concat!("nvmx/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client all mirror traffic goes through, honoring the
/// configured proxy.
pub(crate) fn http_client(config: &Config) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);

    if let Some(proxy_url) = &config.proxy_url {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|source| FetchError::Proxy {
            url: proxy_url.clone(),
            source,
        })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(FetchError::Client)
}

async fn fetch_index(config: &Config) -> Result<Vec<RemoteIndexEntry>, FetchError> {
    let url = format!("{}/index.json", config.mirror_url.trim_end_matches('/'));
    let client = http_client(config)?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus {
            status: response.status(),
            url,
        });
    }

    response.json().await.map_err(FetchError::Parse)
}

fn parse_rows(entries: Vec<RemoteIndexEntry>) -> Vec<CatalogRow> {
    let mut rows: Vec<CatalogRow> = entries
        .into_iter()
        .filter_map(|entry| {
            let version = entry.version.parse().ok()?;
            Some(CatalogRow {
                version,
                lts_codename: entry.lts.codename().map(str::to_string),
            })
        })
        .collect();
    rows.sort_unstable_by(|a, b| b.version.cmp(&a.version));
    rows
}
