use std::fmt;
use thiserror::Error;

/// Operating systems the Node.js distribution mirror publishes tarballs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Darwin,
    Linux,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Darwin => write!(f, "darwin"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// CPU architectures the Node.js distribution mirror publishes tarballs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    Arm64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X64 => write!(f, "x64"),
            Self::Arm64 => write!(f, "arm64"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },
    #[error("Unsupported architecture: {arch}")]
    UnsupportedArch { arch: String },
}

/// The platform/arch pair downloads are named after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostTarget {
    pub platform: Platform,
    pub arch: Arch,
}

impl HostTarget {
    /// Detect the current host's platform and architecture.
    ///
    /// # Errors
    /// Returns an error when the host OS or CPU architecture is outside the
    /// set the distribution mirror publishes for.
    pub fn detect() -> Result<Self, HostError> {
        let platform = match std::env::consts::OS {
            "macos" => Platform::Darwin,
            "linux" => Platform::Linux,
            os => {
                return Err(HostError::UnsupportedPlatform { os: os.to_string() });
            }
        };

        let arch = match std::env::consts::ARCH {
            "x86_64" => Arch::X64,
            "aarch64" => Arch::Arm64,
            arch => {
                return Err(HostError::UnsupportedArch {
                    arch: arch.to_string(),
                });
            }
        };

        Ok(Self { platform, arch })
    }

    /// Top-level directory name inside a distribution tarball, for example
    /// `node-v14.17.0-linux-x64`.
    #[must_use]
    pub fn distribution_name(&self, version_number: &str) -> String {
        format!("node-v{version_number}-{}-{}", self.platform, self.arch)
    }

    /// Tarball file name as published by the mirror.
    #[must_use]
    pub fn archive_name(&self, version_number: &str) -> String {
        format!("{}.tar.gz", self.distribution_name(version_number))
    }
}

#[cfg(test)]
mod tests {
    use super::{Arch, HostTarget, Platform};

    #[test]
    fn platform_and_arch_display_as_mirror_names() {
        assert_eq!(Platform::Darwin.to_string(), "darwin");
        assert_eq!(Platform::Linux.to_string(), "linux");
        assert_eq!(Arch::X64.to_string(), "x64");
        assert_eq!(Arch::Arm64.to_string(), "arm64");
    }

    #[test]
    fn distribution_name_matches_mirror_convention() {
        let target = HostTarget {
            platform: Platform::Linux,
            arch: Arch::X64,
        };

        assert_eq!(
            target.distribution_name("14.17.0"),
            "node-v14.17.0-linux-x64"
        );
        assert_eq!(target.archive_name("14.17.0"), "node-v14.17.0-linux-x64.tar.gz");
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[test]
    fn detect_succeeds_on_supported_hosts() {
        let target = HostTarget::detect().expect("host detection should succeed on supported OS");
        assert!(matches!(target.platform, Platform::Darwin | Platform::Linux));
    }
}
