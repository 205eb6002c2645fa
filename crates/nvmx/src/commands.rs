use std::path::PathBuf;

use nvmx_core::{
    ConfigStore, InstallOutcome, Installer, NodeVersion, RemoteCatalog, VersionResolver,
    VersionStore, active_version, find_version_file,
};
use nvmx_platform::{HostTarget, NvmxPaths};

use crate::cli::{AliasCommand, CacheCommand, Command, ConfigCommand, ConfigKey, ShellKind};
use crate::error::CliError;
use crate::{completions, shell, update};

/// How many versions `ls-remote` prints before summarizing the rest.
const LS_REMOTE_LIMIT: usize = 20;

/// Everything a handler needs: the home layout and the config handle.
struct Context {
    paths: NvmxPaths,
    config: ConfigStore,
}

impl Context {
    fn new() -> Result<Self, CliError> {
        let paths = NvmxPaths::new()?;
        let config = ConfigStore::new(paths.config_file());
        Ok(Self { paths, config })
    }

    fn version_store(&self) -> VersionStore {
        VersionStore::new(self.paths.versions_dir())
    }

    fn catalog(&self) -> RemoteCatalog {
        RemoteCatalog::new(self.config.clone())
    }

    fn resolver(&self) -> VersionResolver {
        VersionResolver::new(self.config.clone())
    }
}

fn current_dir() -> Result<PathBuf, CliError> {
    std::env::current_dir().map_err(CliError::CurrentDir)
}

pub async fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Install { version } => install(version.as_deref()).await,
        Command::Use { version } => switch_to(version.as_deref()),
        Command::List => list().await,
        Command::LsRemote { force } => ls_remote(force).await,
        Command::Current => current().await,
        Command::Uninstall { version } => uninstall(&version),
        Command::Alias(command) => alias(command),
        Command::Config(command) => config(command),
        Command::Cache(command) => cache(command),
        Command::Shell => {
            print!("{}", shell::SNIPPET);
            Ok(())
        }
        Command::Completions { shell } => print_completions(shell),
        Command::CheckUpdate => check_update().await,
        Command::FindVersionFile => print_version_file(),
    }
}

async fn install(spec: Option<&str>) -> Result<(), CliError> {
    let ctx = Context::new()?;
    let installer = Installer::new(ctx.paths.clone(), ctx.config.clone())?;

    let start_dir = current_dir()?;
    let version = ctx
        .resolver()
        .resolve_for_install(spec, &start_dir, &ctx.catalog())
        .await?;

    match installer.install(version).await? {
        InstallOutcome::Installed => println!("Node.js {version} has been installed"),
        InstallOutcome::AlreadyInstalled => println!("Node.js {version} is already installed"),
    }
    Ok(())
}

/// Print the PATH export for the resolved version. The export line is the
/// only stdout output so the shell wrapper can eval it; guidance goes to
/// stderr.
fn switch_to(spec: Option<&str>) -> Result<(), CliError> {
    HostTarget::detect()?;

    let ctx = Context::new()?;
    let start_dir = current_dir()?;
    let version = ctx.resolver().resolve(spec, &start_dir)?;

    if !ctx.version_store().is_installed(version) {
        return Err(nvmx_core::Error::NotInstalled { version }.into());
    }

    let bin_dir = ctx.paths.version_dir(&version.to_string()).join("bin");
    println!("export PATH=\"{}:$PATH\"", bin_dir.display());
    eprintln!("Now using Node.js {version}");
    Ok(())
}

async fn list() -> Result<(), CliError> {
    let ctx = Context::new()?;
    let versions = ctx.version_store().list_installed();
    let active = active_version().await;

    println!("Installed Node.js versions:");
    if versions.is_empty() {
        println!("  No versions installed");
        return Ok(());
    }
    for version in versions {
        let marker = if active == Some(version) { '*' } else { ' ' };
        println!("{marker} {version}");
    }
    Ok(())
}

async fn ls_remote(force: bool) -> Result<(), CliError> {
    let ctx = Context::new()?;
    let versions = ctx.catalog().versions(force).await?;

    println!("Available Node.js versions:");
    for version in versions.iter().take(LS_REMOTE_LIMIT) {
        println!("  {version}");
    }
    if versions.len() > LS_REMOTE_LIMIT {
        println!("  ... and {} more", versions.len() - LS_REMOTE_LIMIT);
    }
    Ok(())
}

async fn current() -> Result<(), CliError> {
    match active_version().await {
        Some(version) => println!("Current Node.js version: {version}"),
        None => println!("No Node.js version is currently active"),
    }
    Ok(())
}

fn uninstall(spec: &str) -> Result<(), CliError> {
    let ctx = Context::new()?;
    let version: NodeVersion = spec.parse().map_err(nvmx_core::Error::from)?;

    ctx.version_store().remove(version)?;
    println!("Node.js {version} has been uninstalled");
    Ok(())
}

fn alias(command: AliasCommand) -> Result<(), CliError> {
    let ctx = Context::new()?;
    match command {
        AliasCommand::List => {
            let aliases = ctx.config.load().aliases;
            println!("Node.js version aliases:");
            if aliases.is_empty() {
                println!("  No aliases configured");
            } else {
                for (name, version) in &aliases {
                    println!("  {name} -> {version}");
                }
            }
            Ok(())
        }
        AliasCommand::Set { name, version } => {
            let version: NodeVersion = version.parse().map_err(nvmx_core::Error::from)?;
            if !ctx.version_store().is_installed(version) {
                return Err(nvmx_core::Error::NotInstalled { version }.into());
            }
            ctx.config.set_alias(name.as_str(), version.to_string())?;
            println!("Alias '{name}' set to Node.js {version}");
            Ok(())
        }
        AliasCommand::Remove { name } => {
            if ctx.config.remove_alias(&name)? {
                println!("Alias '{name}' removed");
                Ok(())
            } else {
                Err(CliError::AliasNotFound { name })
            }
        }
    }
}

fn config(command: ConfigCommand) -> Result<(), CliError> {
    let ctx = Context::new()?;
    match command {
        ConfigCommand::Get { key } => {
            let config = ctx.config.load();
            match key {
                ConfigKey::Mirror => println!("Mirror URL: {}", config.mirror_url),
                ConfigKey::Proxy => println!(
                    "Proxy URL: {}",
                    config.proxy_url.as_deref().unwrap_or("Not set")
                ),
                ConfigKey::Default => println!(
                    "Default version: {}",
                    config.default_version.as_deref().unwrap_or("Not set")
                ),
            }
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            match key {
                ConfigKey::Mirror => {
                    ctx.config.set_mirror_url(value.as_str())?;
                    println!("Mirror URL set to: {value}");
                }
                ConfigKey::Proxy if value == "none" => {
                    ctx.config.set_proxy_url(None)?;
                    println!("Proxy URL set to: Not set");
                }
                ConfigKey::Proxy => {
                    ctx.config.set_proxy_url(Some(value.clone()))?;
                    println!("Proxy URL set to: {value}");
                }
                ConfigKey::Default => {
                    ctx.config.set_default_version(value.as_str())?;
                    println!("Default version set to: {value}");
                }
            }
            Ok(())
        }
    }
}

fn cache(command: CacheCommand) -> Result<(), CliError> {
    let ctx = Context::new()?;
    match command {
        CacheCommand::SetTtl { minutes } => {
            if minutes <= 0 {
                return Err(CliError::NonPositiveTtl);
            }
            ctx.config.set_remote_cache_ttl(minutes)?;
            println!("Remote versions cache TTL set to {minutes} minutes");
            Ok(())
        }
        CacheCommand::ClearRemote => {
            ctx.config.set_remote_cache_versions(Vec::new())?;
            println!("Remote versions cache cleared");
            Ok(())
        }
    }
}

fn print_completions(shell: ShellKind) -> Result<(), CliError> {
    print!("{}", completions::script(shell));
    Ok(())
}

async fn check_update() -> Result<(), CliError> {
    let update = update::check(env!("CARGO_PKG_VERSION")).await;
    if update.has_update {
        println!(
            "A new version of nvmx is available: {}",
            update.latest_version
        );
        println!(
            "Download it from https://github.com/{}/releases/latest",
            update::GITHUB_REPO
        );
    } else {
        println!("nvmx is up to date ({})", update.latest_version);
    }
    Ok(())
}

/// Print the nearest version file for the shell integration's auto-switch.
/// No file is not an error; the snippet checks for empty output.
fn print_version_file() -> Result<(), CliError> {
    let start_dir = current_dir()?;
    if let Some(path) = find_version_file(&start_dir) {
        println!("{}", path.display());
    }
    Ok(())
}
