//! Scheduler errors.

use std::path::PathBuf;
use thiserror::Error;

/// Problems that prevent a run from starting. Job failures are not errors;
/// they are reported through [`crate::RunOutcome::Failed`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no jobs to run")]
    EmptyJobList,

    #[error("failed to create results directory {}: {source}", .path.display())]
    ResultsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
