//! Launcher trait and process types.
//!
//! Launchers start the external collection runner for one job and report
//! how it ended.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Program and arguments for one external process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Program name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// How a launched process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessExit {
    /// The process exited with a status code.
    Exited(i32),
    /// The process was terminated by a signal.
    Signaled(Option<i32>),
    /// The process could not be started at all.
    LaunchFailed(String),
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessExit::Exited(code) => write!(f, "exit {}", code),
            ProcessExit::Signaled(Some(signal)) => write!(f, "killed by signal {}", signal),
            ProcessExit::Signaled(None) => write!(f, "killed by signal ?"),
            ProcessExit::LaunchFailed(reason) => write!(f, "launch failed: {}", reason),
        }
    }
}

impl ProcessExit {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessExit::Exited(0))
    }
}

/// Trait for process launchers.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Name of this launcher.
    fn name(&self) -> &'static str;

    /// Start the process and wait for it to end.
    ///
    /// Failing to start is reported as [`ProcessExit::LaunchFailed`], never
    /// as a separate error.
    async fn launch(&self, spec: ProcessSpec) -> ProcessExit;
}
