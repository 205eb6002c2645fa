use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A concrete Node.js version in canonical `v<major>.<minor>.<patch>` form.
///
/// Parsing accepts an optional `v` prefix and surrounding whitespace;
/// display always emits the prefix. Ordering is numeric by component, so
/// `v10.0.0` sorts above `v9.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl NodeVersion {
    #[must_use]
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The unprefixed `<major>.<minor>.<patch>` form used in download URLs
    /// and archive names.
    #[must_use]
    pub fn number(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Ord for NodeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

impl PartialOrd for NodeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NodeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected X.Y.Z format, got: {input}")]
    InvalidFormat { input: String },
    #[error("Invalid {component} version: {value}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
    },
}

impl FromStr for NodeVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);

        let mut parts = s.split('.');
        let major_str = parts
            .next()
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: s.to_string(),
            })?;
        let minor_str = parts
            .next()
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: s.to_string(),
            })?;
        let patch_str = parts
            .next()
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: s.to_string(),
            })?;
        if parts.next().is_some() {
            return Err(VersionParseError::InvalidFormat {
                input: s.to_string(),
            });
        }

        let major = major_str
            .parse()
            .map_err(|_| VersionParseError::InvalidComponent {
                component: VersionComponent::Major,
                value: major_str.to_string(),
            })?;
        let minor = minor_str
            .parse()
            .map_err(|_| VersionParseError::InvalidComponent {
                component: VersionComponent::Minor,
                value: minor_str.to_string(),
            })?;
        let patch = patch_str
            .parse()
            .map_err(|_| VersionParseError::InvalidComponent {
                component: VersionComponent::Patch,
                value: patch_str.to_string(),
            })?;

        Ok(NodeVersion::new(major, minor, patch))
    }
}

// Persisted as the canonical string form so config.json carries
// "v16.13.0" rather than a struct.
impl Serialize for NodeVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
