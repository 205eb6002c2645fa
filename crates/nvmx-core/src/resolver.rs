use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::catalog::RemoteCatalog;
use crate::config::{Config, ConfigStore};
use crate::error::Error;
use crate::version::NodeVersion;

/// Project files naming the expected runtime, highest priority first.
pub const VERSION_FILE_NAMES: [&str; 2] = [".nvmxrc", ".node-version"];

/// Locate the nearest version-file, walking from `start_dir` up through its
/// ancestors. Within one directory `.nvmxrc` wins over `.node-version`.
#[must_use]
pub fn find_version_file(start_dir: &Path) -> Option<PathBuf> {
    start_dir.ancestors().find_map(|dir| {
        VERSION_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Turns a raw specifier into exactly one concrete version through a
/// first-match-wins chain: alias substitution, direct parse, project
/// version-file, configured default, and, on the install path only, the
/// newest LTS release from the catalog.
///
/// Resolution never checks whether the result is installed; callers decide
/// what an uninstalled result means.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    store: ConfigStore,
}

impl VersionResolver {
    #[must_use]
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Resolve for switching: the chain without the catalog fallback.
    ///
    /// # Errors
    /// Returns [`Error::NoVersionSpecified`] when the chain is exhausted,
    /// or a parse error naming the offending input.
    pub fn resolve(&self, spec: Option<&str>, start_dir: &Path) -> Result<NodeVersion, Error> {
        let config = self.store.load();
        match resolve_local(&config, spec, start_dir)? {
            Some(version) => Ok(version),
            None => Err(Error::NoVersionSpecified),
        }
    }

    /// Resolve for installing: the chain plus a final fallback to the
    /// newest LTS release in the remote catalog.
    ///
    /// # Errors
    /// Parse errors as for [`resolve`](Self::resolve), plus catalog errors
    /// when the LTS fallback is reached and no catalog is obtainable.
    pub async fn resolve_for_install(
        &self,
        spec: Option<&str>,
        start_dir: &Path,
        catalog: &RemoteCatalog,
    ) -> Result<NodeVersion, Error> {
        let config = self.store.load();
        if let Some(version) = resolve_local(&config, spec, start_dir)? {
            return Ok(version);
        }

        info!("No version specified, falling back to the latest LTS release");
        catalog.latest_lts().await
    }
}

/// The chain steps that need no network: alias substitution, direct parse,
/// version-file, configured default.
fn resolve_local(
    config: &Config,
    spec: Option<&str>,
    start_dir: &Path,
) -> Result<Option<NodeVersion>, Error> {
    if let Some(spec) = spec {
        let target = config.resolve_alias(spec);
        if target != spec {
            debug!("Alias '{spec}' resolves to {target}");
        }
        return target.parse().map(Some).map_err(Error::from);
    }

    if let Some(version) = version_from_project_file(start_dir)? {
        return Ok(Some(version));
    }

    match &config.default_version {
        Some(default) => default.parse().map(Some).map_err(Error::from),
        None => Ok(None),
    }
}

fn version_from_project_file(start_dir: &Path) -> Result<Option<NodeVersion>, Error> {
    let Some(path) = find_version_file(start_dir) else {
        return Ok(None);
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(error) => {
            warn!("Failed to read version file {}: {error}", path.display());
            return Ok(None);
        }
    };

    let trimmed = content.trim();
    if trimmed.is_empty() {
        debug!("Version file {} is empty, ignoring it", path.display());
        return Ok(None);
    }

    info!("Using version {trimmed} from {}", path.display());
    match trimmed.parse() {
        Ok(version) => Ok(Some(version)),
        Err(source) => Err(Error::VersionFile { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{VersionResolver, find_version_file};
    use crate::config::ConfigStore;
    use crate::error::Error;
    use crate::version::NodeVersion;

    fn resolver_in(dir: &Path) -> (VersionResolver, ConfigStore) {
        let store = ConfigStore::new(dir.join("config.json"));
        (VersionResolver::new(store.clone()), store)
    }

    #[test]
    fn explicit_specifier_parses_directly() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let (resolver, _) = resolver_in(temp.path());

        let version = resolver
            .resolve(Some("14.17.0"), temp.path())
            .expect("bare specifier should resolve");

        assert_eq!(version, NodeVersion::new(14, 17, 0));
    }

    #[test]
    fn alias_substitution_wins_over_direct_parse() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let (resolver, config) = resolver_in(temp.path());
        config
            .set_alias("lts", "v16.13.0")
            .expect("alias should be stored");

        let version = resolver
            .resolve(Some("lts"), temp.path())
            .expect("alias should resolve");

        assert_eq!(version, NodeVersion::new(16, 13, 0));
    }

    #[test]
    fn unaliased_word_is_a_parse_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let (resolver, _) = resolver_in(temp.path());

        let error = resolver
            .resolve(Some("lts"), temp.path())
            .expect_err("an unaliased word cannot resolve");

        assert!(matches!(error, Error::Version(_)));
    }

    #[test]
    fn chain_prefers_alias_then_file_then_default() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let project = temp.path().join("project");
        std::fs::create_dir_all(&project).expect("project dir should be created");
        std::fs::write(project.join(".nvmxrc"), "14.17.0\n")
            .expect("version file should be written");

        let (resolver, config) = resolver_in(temp.path());
        config
            .set_alias("work", "v16.13.0")
            .expect("alias should be stored");
        config
            .set_default_version("v12.22.0")
            .expect("default should be stored");

        assert_eq!(
            resolver
                .resolve(Some("work"), &project)
                .expect("alias should win"),
            NodeVersion::new(16, 13, 0)
        );
        assert_eq!(
            resolver
                .resolve(None, &project)
                .expect("version file should win once no specifier is given"),
            NodeVersion::new(14, 17, 0)
        );

        std::fs::remove_file(project.join(".nvmxrc")).expect("version file should be removed");
        assert_eq!(
            resolver
                .resolve(None, &project)
                .expect("default should win once the file is gone"),
            NodeVersion::new(12, 22, 0)
        );
    }

    #[test]
    fn nvmxrc_outranks_node_version_in_the_same_directory() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        std::fs::write(temp.path().join(".nvmxrc"), "16.13.0").expect("file should be written");
        std::fs::write(temp.path().join(".node-version"), "14.17.0")
            .expect("file should be written");
        let (resolver, _) = resolver_in(temp.path());

        let version = resolver
            .resolve(None, temp.path())
            .expect("version file should resolve");

        assert_eq!(version, NodeVersion::new(16, 13, 0));
    }

    #[test]
    fn version_file_search_walks_ancestors() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let nested = temp.path().join("workspace/app/src");
        std::fs::create_dir_all(&nested).expect("nested dirs should be created");
        std::fs::write(temp.path().join("workspace/.node-version"), "v10.0.0\n")
            .expect("file should be written");
        let (resolver, _) = resolver_in(temp.path());

        let version = resolver
            .resolve(None, &nested)
            .expect("ancestor file should resolve");

        assert_eq!(version, NodeVersion::new(10, 0, 0));
    }

    #[test]
    fn empty_version_file_falls_through_to_the_default() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        std::fs::write(temp.path().join(".nvmxrc"), "  \n").expect("file should be written");
        let (resolver, config) = resolver_in(temp.path());
        config
            .set_default_version("v12.22.0")
            .expect("default should be stored");

        let version = resolver
            .resolve(None, temp.path())
            .expect("empty file should defer to the default");

        assert_eq!(version, NodeVersion::new(12, 22, 0));
    }

    #[test]
    fn malformed_version_file_reports_the_offending_path() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let file = temp.path().join(".nvmxrc");
        std::fs::write(&file, "banana\n").expect("file should be written");
        let (resolver, _) = resolver_in(temp.path());

        let error = resolver
            .resolve(None, temp.path())
            .expect_err("garbage content cannot resolve");

        match error {
            Error::VersionFile { path, .. } => assert_eq!(path, file),
            other => panic!("expected a version-file error, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_chain_reports_no_version_specified() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let (resolver, _) = resolver_in(temp.path());

        let error = resolver
            .resolve(None, temp.path())
            .expect_err("nothing to resolve from");

        assert!(matches!(error, Error::NoVersionSpecified));
    }

    #[test]
    fn find_version_file_returns_none_when_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");

        assert_eq!(find_version_file(temp.path()), None);
    }
}
