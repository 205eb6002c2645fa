use thiserror::Error;

/// Everything a command handler can fail with. Core and platform errors
/// pass through untouched; the rest are CLI-level validation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] nvmx_core::Error),

    #[error(transparent)]
    Host(#[from] nvmx_platform::HostError),

    #[error(transparent)]
    Paths(#[from] nvmx_platform::NvmxPathsError),

    #[error("Failed to resolve the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("TTL must be a positive number")]
    NonPositiveTtl,

    #[error("Alias '{name}' not found")]
    AliasNotFound { name: String },
}
