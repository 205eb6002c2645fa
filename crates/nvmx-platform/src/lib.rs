mod host;
mod paths;

pub use host::{Arch, HostError, HostTarget, Platform};
pub use paths::{NvmxPaths, NvmxPathsError};
