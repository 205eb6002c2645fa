//! Lifecycle tests against a local mirror: install, uninstall, catalog
//! caching, and the stale-cache fallback.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use nvmx_core::{
    ConfigStore, Error, InstallOutcome, Installer, NodeVersion, RemoteCatalog,
    RemoteVersionsCache, VersionResolver,
};
use nvmx_platform::{HostTarget, NvmxPaths};

/// A mirror URL nothing listens on.
const DEAD_MIRROR: &str = "http://127.0.0.1:1";

struct MirrorServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MirrorServer {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve canned bodies over HTTP/1.1, one connection at a time. Paths not
/// in `routes` answer 404.
fn serve_mirror(routes: HashMap<String, Vec<u8>>) -> MirrorServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("mirror listener should bind");
    let addr = listener.local_addr().expect("mirror address should resolve");
    let hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = Arc::clone(&hits);

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            handler_hits.fetch_add(1, Ordering::SeqCst);
            answer(stream, &routes);
        }
    });

    MirrorServer {
        base_url: format!("http://{addr}"),
        hits,
    }
}

fn answer(mut stream: TcpStream, routes: &HashMap<String, Vec<u8>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("stream should clone"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => {}
            Err(_) => return,
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let response = match routes.get(path) {
        Some(body) => {
            let mut response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .into_bytes();
            response.extend_from_slice(body);
            response
        }
        None => {
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec()
        }
    };

    let _ = stream.write_all(&response);
    let _ = stream.flush();
}

/// A gzipped tarball shaped like a Node.js distribution: the conventional
/// top-level directory with `bin/node` and a lib file inside.
fn node_tarball(dist_name: &str) -> Vec<u8> {
    let staging = tempfile::tempdir().expect("staging dir should be created");
    let root = staging.path().join(dist_name);
    std::fs::create_dir_all(root.join("bin")).expect("staging dirs should be created");
    std::fs::create_dir_all(root.join("lib/node_modules")).expect("staging dirs should be created");
    std::fs::write(root.join("bin/node"), b"#!/bin/sh\necho mock-node\n")
        .expect("mock runtime should be written");
    std::fs::write(root.join("lib/node_modules/README.md"), b"bundled npm docs\n")
        .expect("lib file should be written");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(root.join("bin/node"), std::fs::Permissions::from_mode(0o755))
            .expect("mock runtime should be executable");
    }

    let mut bytes = Vec::new();
    {
        let encoder = GzEncoder::new(&mut bytes, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(dist_name, &root)
            .expect("staging tree should be archived");
        builder
            .into_inner()
            .expect("tar stream should finish")
            .finish()
            .expect("gzip stream should finish");
    }
    bytes
}

fn index_json() -> Vec<u8> {
    br#"[
        {"version": "v16.13.0", "date": "2021-10-26", "files": ["linux-x64", "osx-arm64-tar"], "lts": "Gallium"},
        {"version": "v18.0.0", "date": "2022-04-19", "files": ["linux-x64", "osx-arm64-tar"], "lts": false},
        {"version": "v14.17.0", "date": "2021-05-11", "files": ["linux-x64", "osx-arm64-tar"], "lts": "Fermium"}
    ]"#
    .to_vec()
}

struct TestHome {
    _temp: tempfile::TempDir,
    paths: NvmxPaths,
    config: ConfigStore,
}

fn test_home() -> TestHome {
    let temp = tempfile::tempdir().expect("temp home should be created");
    let paths = NvmxPaths::with_home(temp.path().join("nvmx"));
    let config = ConfigStore::new(paths.config_file());
    TestHome {
        _temp: temp,
        paths,
        config,
    }
}

fn release_mirror(target: &HostTarget, number: &str) -> MirrorServer {
    let mut routes = HashMap::new();
    routes.insert("/index.json".to_string(), index_json());
    routes.insert(
        format!("/v{number}/{}", target.archive_name(number)),
        node_tarball(&target.distribution_name(number)),
    );
    serve_mirror(routes)
}

#[tokio::test]
async fn install_places_the_runtime_and_registers_it() {
    let target = HostTarget::detect().expect("test host should be supported");
    let version = NodeVersion::new(14, 17, 0);
    let mirror = release_mirror(&target, "14.17.0");

    let home = test_home();
    home.config
        .set_mirror_url(mirror.base_url.as_str())
        .expect("mirror should be configured");

    let installer =
        Installer::new(home.paths.clone(), home.config.clone()).expect("host should be supported");
    let outcome = installer
        .install(version)
        .await
        .expect("install should succeed");

    assert_eq!(outcome, InstallOutcome::Installed);
    assert!(installer.store().is_installed(version));
    assert_eq!(installer.store().list_installed(), vec![version]);
    assert!(
        home.paths
            .version_dir("v14.17.0")
            .join("bin/node")
            .is_file()
    );
    assert!(
        home.paths
            .cache_dir()
            .join(target.archive_name("14.17.0"))
            .is_file(),
        "the downloaded archive must stay cached"
    );
    assert!(
        !home
            .paths
            .cache_dir()
            .join(target.distribution_name("14.17.0"))
            .exists(),
        "the extracted scratch tree must be removed"
    );
}

#[tokio::test]
async fn reinstalling_an_installed_version_needs_no_network() {
    let target = HostTarget::detect().expect("test host should be supported");
    let version = NodeVersion::new(14, 17, 0);
    let mirror = release_mirror(&target, "14.17.0");

    let home = test_home();
    home.config
        .set_mirror_url(mirror.base_url.as_str())
        .expect("mirror should be configured");
    let installer =
        Installer::new(home.paths.clone(), home.config.clone()).expect("host should be supported");
    installer
        .install(version)
        .await
        .expect("first install should succeed");

    home.config
        .set_mirror_url(DEAD_MIRROR)
        .expect("mirror should be reconfigured");
    let outcome = installer
        .install(version)
        .await
        .expect("second install should succeed offline");

    assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
}

#[tokio::test]
async fn failed_download_leaves_nothing_installed() {
    let version = NodeVersion::new(14, 17, 0);
    let mirror = serve_mirror(HashMap::new());

    let home = test_home();
    home.config
        .set_mirror_url(mirror.base_url.as_str())
        .expect("mirror should be configured");
    let installer =
        Installer::new(home.paths.clone(), home.config.clone()).expect("host should be supported");

    let error = installer
        .install(version)
        .await
        .expect_err("a 404 download must fail the install");

    assert!(matches!(
        error,
        Error::InstallFailed {
            phase: "download",
            ..
        }
    ));
    assert!(!installer.store().is_installed(version));
    assert!(installer.store().list_installed().is_empty());
}

#[tokio::test]
async fn catalog_fetch_persists_an_envelope_and_later_reads_hit_the_cache() {
    let mut routes = HashMap::new();
    routes.insert("/index.json".to_string(), index_json());
    let mirror = serve_mirror(routes);

    let home = test_home();
    home.config
        .set_mirror_url(mirror.base_url.as_str())
        .expect("mirror should be configured");
    let catalog = RemoteCatalog::new(home.config.clone());

    let versions = catalog.versions(false).await.expect("fetch should succeed");
    assert_eq!(versions, vec!["v18.0.0", "v16.13.0", "v14.17.0"]);

    let envelope = home
        .config
        .remote_cache()
        .expect("an envelope should be persisted");
    assert_eq!(envelope.versions, versions);
    assert_eq!(envelope.ttl, 30);

    let hits_after_fetch = mirror.hits();
    let cached = catalog
        .versions(false)
        .await
        .expect("cached read should succeed");
    assert_eq!(cached, versions);
    assert_eq!(
        mirror.hits(),
        hits_after_fetch,
        "a valid cache must answer without network"
    );
}

#[tokio::test]
async fn force_refresh_bypasses_a_valid_cache() {
    let mut routes = HashMap::new();
    routes.insert("/index.json".to_string(), index_json());
    let mirror = serve_mirror(routes);

    let home = test_home();
    home.config
        .update(|config| {
            config.mirror_url = mirror.base_url.clone();
            config.remote_versions_cache = Some(RemoteVersionsCache {
                versions: vec!["v1.0.0".to_string()],
                timestamp: Utc::now(),
                ttl: 30,
            });
        })
        .expect("seed config should be written");
    let catalog = RemoteCatalog::new(home.config.clone());

    let cached = catalog
        .versions(false)
        .await
        .expect("cached read should succeed");
    assert_eq!(cached, vec!["v1.0.0"]);
    assert_eq!(mirror.hits(), 0);

    let refreshed = catalog
        .versions(true)
        .await
        .expect("forced refresh should succeed");
    assert_eq!(refreshed, vec!["v18.0.0", "v16.13.0", "v14.17.0"]);
    assert!(mirror.hits() > 0);
}

#[tokio::test]
async fn stale_cache_answers_when_the_fetch_fails() {
    let home = test_home();
    home.config
        .update(|config| {
            config.mirror_url = DEAD_MIRROR.to_string();
            config.remote_versions_cache = Some(RemoteVersionsCache {
                versions: vec!["v12.22.0".to_string()],
                timestamp: Utc::now() - Duration::hours(2),
                ttl: 30,
            });
        })
        .expect("seed config should be written");
    let catalog = RemoteCatalog::new(home.config.clone());

    let versions = catalog
        .versions(false)
        .await
        .expect("a stale cache must still answer");

    assert_eq!(versions, vec!["v12.22.0"]);
}

#[tokio::test]
async fn catalog_fails_when_the_fetch_fails_and_nothing_is_cached() {
    let home = test_home();
    home.config
        .set_mirror_url(DEAD_MIRROR)
        .expect("mirror should be configured");
    let catalog = RemoteCatalog::new(home.config.clone());

    let error = catalog
        .versions(false)
        .await
        .expect_err("no cache and no mirror must fail");

    assert!(matches!(error, Error::CatalogUnavailable(_)));
}

#[tokio::test]
async fn install_resolution_falls_back_to_the_newest_lts_release() {
    let mut routes = HashMap::new();
    routes.insert("/index.json".to_string(), index_json());
    let mirror = serve_mirror(routes);

    let home = test_home();
    home.config
        .set_mirror_url(mirror.base_url.as_str())
        .expect("mirror should be configured");
    let resolver = VersionResolver::new(home.config.clone());
    let catalog = RemoteCatalog::new(home.config.clone());

    let project = home.paths.home().join("empty-project");
    std::fs::create_dir_all(&project).expect("project dir should be created");

    let version = resolver
        .resolve_for_install(None, &project, &catalog)
        .await
        .expect("LTS fallback should resolve");

    assert_eq!(
        version,
        NodeVersion::new(16, 13, 0),
        "the newest LTS-tagged release must win over the newest release"
    );
}

#[tokio::test]
async fn uninstall_removes_the_version_and_rejects_a_second_attempt() {
    let target = HostTarget::detect().expect("test host should be supported");
    let version = NodeVersion::new(14, 17, 0);
    let mirror = release_mirror(&target, "14.17.0");

    let home = test_home();
    home.config
        .set_mirror_url(mirror.base_url.as_str())
        .expect("mirror should be configured");
    let installer =
        Installer::new(home.paths.clone(), home.config.clone()).expect("host should be supported");
    installer
        .install(version)
        .await
        .expect("install should succeed");

    installer
        .uninstall(version)
        .expect("uninstall should succeed");
    assert!(!installer.store().is_installed(version));
    assert!(installer.store().list_installed().is_empty());

    let error = installer
        .uninstall(version)
        .expect_err("a second uninstall must fail");
    assert!(matches!(error, Error::NotInstalled { .. }));
}

#[tokio::test]
async fn alias_resolves_to_its_installed_target() {
    let target = HostTarget::detect().expect("test host should be supported");
    let version = NodeVersion::new(16, 13, 0);
    let mirror = release_mirror(&target, "16.13.0");

    let home = test_home();
    home.config
        .set_mirror_url(mirror.base_url.as_str())
        .expect("mirror should be configured");
    let installer =
        Installer::new(home.paths.clone(), home.config.clone()).expect("host should be supported");
    installer
        .install(version)
        .await
        .expect("install should succeed");
    home.config
        .set_alias("lts", "v16.13.0")
        .expect("alias should be stored");

    let resolver = VersionResolver::new(home.config.clone());
    let resolved = resolver
        .resolve(Some("lts"), home.paths.home())
        .expect("alias should resolve");

    assert_eq!(resolved, version);
    assert!(installer.store().is_installed(resolved));
}
