use log::debug;
use semver::Version;
use serde::Deserialize;

pub const GITHUB_REPO: &str = "kaushiksamanta/nvmx";

#[derive(Deserialize)]
struct GitHubRelease {
    tag_name: String,
}

#[derive(Debug, thiserror::Error)]
enum UpdateError {
    #[error("failed to check for an update: {0}")]
    Request(#[source] reqwest::Error),
    #[error("update check failed with HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("failed to parse the release response: {0}")]
    Parse(#[source] reqwest::Error),
}

/// What the release check concluded.
#[derive(Debug, Clone)]
pub struct UpdateCheck {
    pub has_update: bool,
    pub latest_version: String,
}

/// Compare the latest published release against `current_version`.
///
/// Failures degrade to "no update": a release check must never break a
/// working installation.
pub async fn check(current_version: &str) -> UpdateCheck {
    let current = current_version.strip_prefix('v').unwrap_or(current_version);

    match fetch_latest_tag().await {
        Ok(tag) => {
            let latest = tag.strip_prefix('v').unwrap_or(&tag);
            UpdateCheck {
                has_update: is_newer_version(latest, current),
                latest_version: format!("v{latest}"),
            }
        }
        Err(error) => {
            debug!("Update check failed: {error}");
            UpdateCheck {
                has_update: false,
                latest_version: format!("v{current}"),
            }
        }
    }
}

async fn fetch_latest_tag() -> Result<String, UpdateError> {
    let url = format!("https://api.github.com/repos/{GITHUB_REPO}/releases/latest");

    let response = reqwest::Client::new()
        .get(&url)
        .header("User-Agent", "nvmx")
        .send()
        .await
        .map_err(UpdateError::Request)?;

    if !response.status().is_success() {
        return Err(UpdateError::HttpStatus(response.status()));
    }

    let release: GitHubRelease = response.json().await.map_err(UpdateError::Parse)?;
    Ok(release.tag_name)
}

/// Strict semver comparison; anything unparsable reports no update.
fn is_newer_version(latest: &str, current: &str) -> bool {
    match (Version::parse(latest), Version::parse(current)) {
        (Ok(latest), Ok(current)) => latest > current,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_newer_version;

    #[test]
    fn version_comparison_follows_semver() {
        assert!(is_newer_version("0.1.1", "0.1.0"));
        assert!(is_newer_version("1.0.0", "0.9.9"));
        assert!(is_newer_version("0.2.0", "0.2.0-beta.1"));
        assert!(!is_newer_version("0.1.0", "0.1.0"));
        assert!(!is_newer_version("0.1.0", "0.2.0"));
    }

    #[test]
    fn unparsable_versions_never_report_an_update() {
        assert!(!is_newer_version("latest", "0.1.0"));
        assert!(!is_newer_version("1.0.0", "unknown"));
    }
}
