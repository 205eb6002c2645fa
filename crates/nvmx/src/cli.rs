use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "nvmx",
    version,
    about = "POSIX-compliant Node.js version manager"
)]
pub struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install a Node.js version (latest LTS when nothing names one)
    Install {
        /// Version or alias; omit to use a version file, the default, or LTS
        version: Option<String>,
    },
    /// Print the PATH export for a version; eval it to switch
    Use {
        /// Version or alias; omit to use a version file or the default
        version: Option<String>,
    },
    /// List installed versions
    #[command(alias = "ls")]
    List,
    /// List versions published by the distribution mirror
    LsRemote {
        /// Refresh the catalog even if the cached copy is still valid
        #[arg(short, long)]
        force: bool,
    },
    /// Show the Node.js version active on PATH
    Current,
    /// Remove an installed version
    #[command(alias = "remove")]
    Uninstall { version: String },
    /// Manage version aliases
    #[command(subcommand)]
    Alias(AliasCommand),
    /// Read or change configuration values
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage the remote versions cache
    #[command(subcommand)]
    Cache(CacheCommand),
    /// Print the shell integration snippet
    Shell,
    /// Print a completion script
    Completions { shell: ShellKind },
    /// Check whether a newer nvmx release is available
    CheckUpdate,
    /// Print the nearest project version file, used by the shell integration
    #[command(hide = true)]
    FindVersionFile,
}

#[derive(Debug, Subcommand)]
pub enum AliasCommand {
    /// List configured aliases
    #[command(alias = "ls")]
    List,
    /// Point an alias at an installed version
    Set { name: String, version: String },
    /// Remove an alias
    #[command(name = "rm", alias = "remove")]
    Remove { name: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print a configuration value
    Get { key: ConfigKey },
    /// Change a configuration value
    Set {
        key: ConfigKey,
        /// New value; "none" clears the proxy
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Distribution mirror base URL
    Mirror,
    /// HTTP proxy for mirror traffic
    Proxy,
    /// Version used when nothing else names one
    Default,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Change how long fetched catalog versions stay valid, in minutes
    SetTtl {
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Drop the cached catalog versions
    ClearRemote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{CacheCommand, Cli, Command, ConfigCommand, ConfigKey};

    #[test]
    fn subcommand_aliases_parse() {
        let cli = Cli::parse_from(["nvmx", "ls"]);
        assert!(matches!(cli.command, Command::List));

        let cli = Cli::parse_from(["nvmx", "remove", "14.17.0"]);
        assert!(matches!(cli.command, Command::Uninstall { .. }));
    }

    #[test]
    fn verbosity_counts_repeated_flags() {
        let cli = Cli::parse_from(["nvmx", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn config_keys_parse_from_kebab_case() {
        let cli = Cli::parse_from(["nvmx", "config", "get", "mirror"]);
        match cli.command {
            Command::Config(ConfigCommand::Get { key }) => {
                assert_eq!(key, ConfigKey::Mirror);
            }
            other => panic!("expected config get, got {other:?}"),
        }
    }

    #[test]
    fn negative_ttl_reaches_the_handler_instead_of_clap() {
        let cli = Cli::parse_from(["nvmx", "cache", "set-ttl", "-5"]);
        match cli.command {
            Command::Cache(CacheCommand::SetTtl { minutes }) => assert_eq!(minutes, -5),
            other => panic!("expected cache set-ttl, got {other:?}"),
        }
    }
}
