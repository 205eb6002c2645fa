use log::debug;
use tokio::process::Command;
use which::which;

use crate::version::NodeVersion;

/// Query the Node.js runtime active on `PATH`, if any.
///
/// Every failure (no binary, failed invocation, unparsable output) yields
/// `None`: "nothing active" is a normal state, not an error.
pub async fn active_version() -> Option<NodeVersion> {
    let node = match which("node") {
        Ok(path) => path,
        Err(error) => {
            debug!("No node binary on PATH: {error}");
            return None;
        }
    };

    let output = match Command::new(&node).arg("--version").output().await {
        Ok(output) => output,
        Err(error) => {
            debug!("Failed to run {}: {error}", node.display());
            return None;
        }
    };

    if !output.status.success() {
        debug!("node --version exited with {}", output.status);
        return None;
    }

    match parse_version_output(&output.stdout) {
        Some(version) => Some(version),
        None => {
            debug!("Unparsable node --version output");
            None
        }
    }
}

fn parse_version_output(stdout: &[u8]) -> Option<NodeVersion> {
    String::from_utf8_lossy(stdout).trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_version_output;
    use crate::version::NodeVersion;

    #[test]
    fn version_output_is_trimmed_and_parsed() {
        assert_eq!(
            parse_version_output(b"v20.11.0\n"),
            Some(NodeVersion::new(20, 11, 0))
        );
    }

    #[test]
    fn garbage_output_parses_to_none() {
        assert_eq!(parse_version_output(b"zsh: command not found"), None);
        assert_eq!(parse_version_output(b""), None);
    }
}
