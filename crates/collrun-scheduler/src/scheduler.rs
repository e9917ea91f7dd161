//! Run scheduler - executes a job list through a launcher.

use crate::SchedulerError;
use crate::command::build_command;
use crate::state::{Completion, RunState};
use chrono::{DateTime, Utc};
use collrun_core::{Job, Launcher, ProcessExit, RunConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

pub use crate::state::JobFailure;

/// Event emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    JobStarted {
        index: usize,
        collection: String,
    },
    JobSucceeded {
        index: usize,
        collection: String,
    },
    /// The run's first failure.
    JobFailed {
        index: usize,
        collection: String,
        exit: ProcessExit,
    },
    /// A job that was already running when the run failed has ended.
    JobFinishedAfterFailure {
        index: usize,
        collection: String,
        exit: ProcessExit,
    },
    RunCompleted {
        success: bool,
    },
}

/// Statistics of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    /// Most jobs observed running at the same time.
    pub peak_active: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Terminal result of a run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Success(RunSummary),
    Failed(JobFailure),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }
}

/// Schedules a run's jobs onto a launcher.
pub struct RunScheduler {
    launcher: Arc<dyn Launcher>,
    config: RunConfig,
}

impl RunScheduler {
    pub fn new(launcher: Arc<dyn Launcher>, config: RunConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute a run, returning a channel of events and a handle to get the final result.
    pub fn execute(
        &self,
        jobs: Vec<Job>,
    ) -> (
        mpsc::UnboundedReceiver<RunEvent>,
        tokio::task::JoinHandle<Result<RunOutcome, SchedulerError>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let launcher = self.launcher.clone();
        let config = self.config.clone();

        let handle =
            tokio::spawn(async move { Self::execute_inner(launcher, config, jobs, tx).await });

        (rx, handle)
    }

    /// Run every job and wait for the terminal outcome, reporting progress on `tx`.
    ///
    /// Sending never blocks, so the run makes progress whether or not
    /// anyone reads the events.
    pub async fn run(
        &self,
        jobs: Vec<Job>,
        tx: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<RunOutcome, SchedulerError> {
        Self::execute_inner(self.launcher.clone(), self.config.clone(), jobs, tx).await
    }

    async fn execute_inner(
        launcher: Arc<dyn Launcher>,
        config: RunConfig,
        jobs: Vec<Job>,
        tx: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<RunOutcome, SchedulerError> {
        if jobs.is_empty() {
            return Err(SchedulerError::EmptyJobList);
        }

        tokio::fs::create_dir_all(&config.results_dir)
            .await
            .map_err(|source| SchedulerError::ResultsDir {
                path: config.results_dir.clone(),
                source,
            })?;

        let started_at = Utc::now();
        let state = if config.parallel {
            let limit = config.effective_limit(jobs.len());
            info!(jobs = jobs.len(), limit, launcher = launcher.name(), "Starting parallel run");
            Self::run_parallel(&launcher, &config, RunState::new(jobs, limit), &tx).await
        } else {
            info!(jobs = jobs.len(), launcher = launcher.name(), "Starting sequential run");
            Self::run_sequential(&launcher, &config, RunState::new(jobs, 1), &tx).await
        };

        let outcome = match state.failure() {
            Some(failure) => RunOutcome::Failed(failure.clone()),
            None => RunOutcome::Success(RunSummary {
                total: state.total(),
                completed: state.completed(),
                peak_active: state.peak_active(),
                started_at,
                finished_at: Utc::now(),
            }),
        };

        let _ = tx.send(RunEvent::RunCompleted {
            success: outcome.is_success(),
        });

        Ok(outcome)
    }

    /// Launch one job at a time, stopping at the first failure.
    async fn run_sequential(
        launcher: &Arc<dyn Launcher>,
        config: &RunConfig,
        mut state: RunState,
        tx: &mpsc::UnboundedSender<RunEvent>,
    ) -> RunState {
        while let Some((index, job)) = state.next_launch() {
            let spec = build_command(&job, index, &config.results_dir, config);
            debug!(index, program = %spec.program, args = ?spec.args, "Spawning sequential job");
            Self::job_started(index, &job.collection, tx);

            let launcher = launcher.clone();
            let exit = tokio::spawn(async move { launcher.launch(spec).await })
                .await
                .unwrap_or_else(task_failure);
            let completion = state.complete(index, &job.collection, &exit);
            Self::job_completed(completion, index, job.collection, exit, tx);
        }

        state
    }

    /// Keep up to the state's limit in flight, refilling as jobs succeed.
    ///
    /// After the first failure nothing new is launched, but jobs already in
    /// flight are awaited so none outlive the run.
    async fn run_parallel(
        launcher: &Arc<dyn Launcher>,
        config: &RunConfig,
        mut state: RunState,
        tx: &mpsc::UnboundedSender<RunEvent>,
    ) -> RunState {
        let mut in_flight: JoinSet<ProcessExit> = JoinSet::new();
        let mut jobs_by_task = HashMap::new();

        loop {
            while let Some((index, job)) = state.next_launch() {
                let spec = build_command(&job, index, &config.results_dir, config);
                debug!(index, program = %spec.program, args = ?spec.args, "Spawning parallel job");
                Self::job_started(index, &job.collection, tx);

                let launcher = launcher.clone();
                let task = in_flight.spawn(async move { launcher.launch(spec).await });
                jobs_by_task.insert(task.id(), (index, job.collection));
            }

            let Some(joined) = in_flight.join_next_with_id().await else {
                break;
            };

            let (task_id, exit) = match joined {
                Ok((task_id, exit)) => (task_id, exit),
                Err(e) => (e.id(), task_failure(e)),
            };

            let Some((index, collection)) = jobs_by_task.remove(&task_id) else {
                warn!(%task_id, "Completion for unknown task");
                continue;
            };

            let completion = state.complete(index, &collection, &exit);
            Self::job_completed(completion, index, collection, exit, tx);
        }

        debug_assert!(state.is_finished());
        state
    }

    fn job_started(index: usize, collection: &str, tx: &mpsc::UnboundedSender<RunEvent>) {
        info!(index, collection, "Starting job");
        let _ = tx.send(RunEvent::JobStarted {
            index,
            collection: collection.to_string(),
        });
    }

    fn job_completed(
        completion: Completion,
        index: usize,
        collection: String,
        exit: ProcessExit,
        tx: &mpsc::UnboundedSender<RunEvent>,
    ) {
        let event = match completion {
            Completion::Succeeded => {
                info!(index, collection = %collection, "Finished job");
                RunEvent::JobSucceeded { index, collection }
            }
            Completion::Failed => {
                error!(index, collection = %collection, exit = %exit, "Job failed");
                RunEvent::JobFailed {
                    index,
                    collection,
                    exit,
                }
            }
            Completion::AfterFailure => {
                info!(index, collection = %collection, exit = %exit, "Job finished after run failed");
                RunEvent::JobFinishedAfterFailure {
                    index,
                    collection,
                    exit,
                }
            }
        };

        let _ = tx.send(event);
    }
}

/// A launch task that panicked or was cancelled counts as a launch failure.
fn task_failure(e: JoinError) -> ProcessExit {
    ProcessExit::LaunchFailed(format!("launch task failed: {}", e))
}
