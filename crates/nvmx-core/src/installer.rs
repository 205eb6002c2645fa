use std::path::Path;

use log::{debug, info};
use tokio::io::AsyncWriteExt;

use nvmx_platform::{HostTarget, NvmxPaths};

use crate::catalog;
use crate::config::{Config, ConfigStore};
use crate::error::Error;
use crate::store::VersionStore;
use crate::version::NodeVersion;

/// How an install request concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A distribution was downloaded, extracted, and placed.
    Installed,
    /// The version already passed the installed check; nothing was touched.
    AlreadyInstalled,
}

/// Orchestrates the install and uninstall lifecycle against the version
/// store.
///
/// Installs are idempotent and non-atomic: the archive is downloaded into
/// the cache, extracted there, then copied into the live destination. A
/// crash mid-copy leaves a partial directory that the installed check
/// rejects, and the next install attempt overwrites it.
pub struct Installer {
    paths: NvmxPaths,
    config: ConfigStore,
    store: VersionStore,
    target: HostTarget,
}

impl Installer {
    /// # Errors
    /// Fails immediately when the host platform or architecture is outside
    /// the set the distribution mirror publishes binaries for.
    pub fn new(paths: NvmxPaths, config: ConfigStore) -> Result<Self, Error> {
        let target = HostTarget::detect()?;
        let store = VersionStore::new(paths.versions_dir());
        Ok(Self {
            paths,
            config,
            store,
            target,
        })
    }

    #[must_use]
    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// Download, extract, and place one version. A version that is already
    /// installed succeeds without touching the network.
    ///
    /// The downloaded archive stays in the cache for later reuse; only the
    /// extracted scratch tree is removed after the copy.
    ///
    /// # Errors
    /// Returns [`Error::InstallFailed`] naming the phase that failed. A
    /// failed download leaves no version directory; a failed extract or
    /// copy can leave a partial one, which the installed check treats as
    /// absent.
    pub async fn install(&self, version: NodeVersion) -> Result<InstallOutcome, Error> {
        if self.store.is_installed(version) {
            info!("Node.js {version} is already installed");
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        self.paths
            .ensure_dirs()
            .map_err(|error| Error::install_failed(version, "prepare", error.to_string()))?;

        let config = self.config.load();
        let number = version.number();
        let archive_name = self.target.archive_name(&number);
        let url = download_url(&config.mirror_url, &number, &archive_name);
        let archive_path = self.paths.cache_dir().join(&archive_name);

        info!(
            "Downloading Node.js {version} for {}-{}",
            self.target.platform, self.target.arch
        );
        self.download(&config, &url, &archive_path, version).await?;

        let dest_dir = self.paths.version_dir(&version.to_string());
        std::fs::create_dir_all(&dest_dir)
            .map_err(|error| Error::install_failed(version, "prepare", error.to_string()))?;

        info!("Extracting Node.js {version}");
        extract_tarball(&archive_path, &self.paths.cache_dir())
            .map_err(|error| Error::install_failed(version, "extract", error.to_string()))?;

        let extracted_dir = self
            .paths
            .cache_dir()
            .join(self.target.distribution_name(&number));
        copy_dir_recursive(&extracted_dir, &dest_dir).map_err(|error| {
            Error::install_failed(
                version,
                "copy",
                format!(
                    "{} -> {}: {error}",
                    extracted_dir.display(),
                    dest_dir.display()
                ),
            )
        })?;

        std::fs::remove_dir_all(&extracted_dir)
            .map_err(|error| Error::install_failed(version, "cleanup", error.to_string()))?;

        info!("Node.js {version} has been installed");
        Ok(InstallOutcome::Installed)
    }

    /// Remove an installed version.
    ///
    /// # Errors
    /// Surfaces [`Error::NotInstalled`] from the version store unchanged.
    pub fn uninstall(&self, version: NodeVersion) -> Result<(), Error> {
        self.store.remove(version)
    }

    async fn download(
        &self,
        config: &Config,
        url: &str,
        dest: &Path,
        version: NodeVersion,
    ) -> Result<(), Error> {
        use futures_util::StreamExt;

        let fail = |details: String| Error::install_failed(version, "download", details);

        let client = catalog::http_client(config).map_err(|error| fail(error.to_string()))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|error| fail(format!("request to {url} failed: {error}")))?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP {} for {url}", response.status())));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|error| fail(format!("{}: {error}", dest.display())))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|error| fail(format!("stream error: {error}")))?;
            file.write_all(&chunk)
                .await
                .map_err(|error| fail(format!("{}: {error}", dest.display())))?;
        }
        file.flush()
            .await
            .map_err(|error| fail(format!("{}: {error}", dest.display())))?;

        debug!("Downloaded {url} to {}", dest.display());
        Ok(())
    }
}

fn download_url(mirror_url: &str, version_number: &str, archive_name: &str) -> String {
    format!(
        "{}/v{version_number}/{archive_name}",
        mirror_url.trim_end_matches('/')
    )
}

fn extract_tarball(archive: &Path, dest: &Path) -> std::io::Result<()> {
    let file = std::fs::File::open(archive)?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut tarball = tar::Archive::new(decoder);
    tarball.unpack(dest)
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dest_path)?;
        } else {
            std::fs::copy(&src_path, &dest_path)?;
        }
    }

    Ok(())
}
