//! Runner binary detection.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Where the Postman CLI is usually found, tried in order.
pub const RUNNER_CANDIDATES: &[&str] = &[
    "postman",
    "postman.cmd",
    "postman.exe",
    "/opt/homebrew/bin/postman",
    "/usr/local/bin/postman",
    "/snap/bin/postman",
];

/// An installed runner binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerInfo {
    /// Candidate that answered.
    pub command: String,
    /// Trimmed `--version` output, possibly empty.
    pub version: String,
}

/// Return the first candidate whose `--version` exits successfully.
pub async fn probe_runner<S: AsRef<str>>(candidates: &[S]) -> Option<RunnerInfo> {
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let output = Command::new(candidate)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                return Some(RunnerInfo {
                    command: candidate.to_string(),
                    version: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                });
            }
            Ok(output) => {
                debug!(candidate, status = %output.status, "Runner candidate rejected");
            }
            Err(e) => {
                debug!(candidate, error = %e, "Runner candidate not found");
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_finds_nothing() {
        let found = probe_runner(&["collrun-no-such-runner", "/nonexistent/postman"]).await;
        assert!(found.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_skips_missing_candidates() {
        let found = probe_runner(&["collrun-no-such-runner", "true"]).await.unwrap();
        assert_eq!(found.command, "true");
    }
}
