//! Local process launcher.

use async_trait::async_trait;
use collrun_core::executor::{Launcher, ProcessExit, ProcessSpec};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs each job as a child process sharing this process's terminal.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn launch(&self, spec: ProcessSpec) -> ProcessExit {
        debug!(program = %spec.program, args = ?spec.args, "Spawning process");

        let mut child = match Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %spec.program, error = %e, "Failed to spawn process");
                return ProcessExit::LaunchFailed(format!("{}: {}", spec.program, e));
            }
        };

        match child.wait().await {
            Ok(status) => exit_from_status(status),
            Err(e) => {
                warn!(program = %spec.program, error = %e, "Failed to wait for process");
                ProcessExit::LaunchFailed(format!("{}: {}", spec.program, e))
            }
        }
    }
}

fn exit_from_status(status: ExitStatus) -> ProcessExit {
    match status.code() {
        Some(code) => ProcessExit::Exited(code),
        None => ProcessExit::Signaled(signal_of(&status)),
    }
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_launch_failure() {
        let launcher = ProcessLauncher::new();
        let exit = launcher
            .launch(ProcessSpec::new(
                "collrun-definitely-not-installed",
                vec!["--version".to_string()],
            ))
            .await;

        match exit {
            ProcessExit::LaunchFailed(reason) => {
                assert!(reason.starts_with("collrun-definitely-not-installed"))
            }
            other => panic!("Expected LaunchFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_codes_are_reported() {
        let launcher = ProcessLauncher::new();

        let ok = launcher
            .launch(ProcessSpec::new("sh", vec!["-c".to_string(), "exit 0".to_string()]))
            .await;
        assert_eq!(ok, ProcessExit::Exited(0));

        let failed = launcher
            .launch(ProcessSpec::new("sh", vec!["-c".to_string(), "exit 42".to_string()]))
            .await;
        assert_eq!(failed, ProcessExit::Exited(42));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_termination() {
        let launcher = ProcessLauncher::new();
        let exit = launcher
            .launch(ProcessSpec::new(
                "sh",
                vec!["-c".to_string(), "kill -9 $$".to_string()],
            ))
            .await;

        assert_eq!(exit, ProcessExit::Signaled(Some(9)));
        assert!(!exit.is_success());
    }
}
