//! Process launching for collrun.
//!
//! Provides:
//! - A local launcher that runs the collection runner as a child process
//! - Probing for an installed runner binary

pub mod probe;
pub mod process;

pub use collrun_core::executor::{Launcher, ProcessExit, ProcessSpec};
pub use probe::{RUNNER_CANDIDATES, RunnerInfo, probe_runner};
pub use process::ProcessLauncher;
