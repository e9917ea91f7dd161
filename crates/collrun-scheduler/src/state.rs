//! Bookkeeping for a single run.

use collrun_core::{Job, ProcessExit};
use std::collections::VecDeque;
use std::fmt;

/// The first job that failed a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Zero-based position in the job list.
    pub index: usize,
    /// Collection the job ran.
    pub collection: String,
    /// How the job's process ended.
    pub exit: ProcessExit,
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job {} failed: {} ({})",
            self.index + 1,
            self.collection,
            self.exit
        )
    }
}

/// What a completion meant for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The job succeeded while the run was still healthy.
    Succeeded,
    /// The job is the run's first failure.
    Failed,
    /// The job ended after the run had already failed; its result is ignored.
    AfterFailure,
}

/// Pending queue, active count and outcome of one run.
///
/// Jobs leave the queue strictly in list order, never more than `limit`
/// are active at once, and nothing is dequeued once a failure is recorded.
#[derive(Debug)]
pub struct RunState {
    pending: VecDeque<(usize, Job)>,
    limit: usize,
    total: usize,
    active: usize,
    peak_active: usize,
    completed: usize,
    failure: Option<JobFailure>,
}

impl RunState {
    pub fn new(jobs: Vec<Job>, limit: usize) -> Self {
        let total = jobs.len();
        Self {
            pending: jobs.into_iter().enumerate().collect(),
            limit: limit.max(1),
            total,
            active: 0,
            peak_active: 0,
            completed: 0,
            failure: None,
        }
    }

    /// Dequeue the next job if a slot is free and the run has not failed.
    pub fn next_launch(&mut self) -> Option<(usize, Job)> {
        if self.failure.is_some() || self.active >= self.limit {
            return None;
        }

        let next = self.pending.pop_front()?;
        self.active += 1;
        self.peak_active = self.peak_active.max(self.active);
        Some(next)
    }

    /// Record that an active job ended.
    pub fn complete(&mut self, index: usize, collection: &str, exit: &ProcessExit) -> Completion {
        self.active = self.active.saturating_sub(1);
        self.completed += 1;

        if self.failure.is_some() {
            Completion::AfterFailure
        } else if exit.is_success() {
            Completion::Succeeded
        } else {
            self.failure = Some(JobFailure {
                index,
                collection: collection.to_string(),
                exit: exit.clone(),
            });
            Completion::Failed
        }
    }

    /// Whether nothing is running and nothing more will be launched.
    pub fn is_finished(&self) -> bool {
        self.active == 0 && (self.pending.is_empty() || self.failure.is_some())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn peak_active(&self) -> usize {
        self.peak_active
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        self.failure.as_ref()
    }

    pub fn into_failure(self) -> Option<JobFailure> {
        self.failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs(n: usize) -> Vec<Job> {
        (0..n).map(|i| Job::new(format!("c{}.json", i))).collect()
    }

    #[test]
    fn test_dequeues_in_order_up_to_limit() {
        let mut state = RunState::new(jobs(5), 2);

        let (a, _) = state.next_launch().unwrap();
        let (b, _) = state.next_launch().unwrap();
        assert_eq!((a, b), (0, 1));
        assert!(state.next_launch().is_none());
        assert_eq!(state.active(), 2);

        assert_eq!(state.complete(0, "c0.json", &ProcessExit::Exited(0)), Completion::Succeeded);
        let (c, job) = state.next_launch().unwrap();
        assert_eq!(c, 2);
        assert_eq!(job.collection, "c2.json");
        assert_eq!(state.peak_active(), 2);
        assert_eq!(state.pending(), 2);
    }

    #[test]
    fn test_zero_limit_is_treated_as_one() {
        let mut state = RunState::new(jobs(2), 0);
        assert_eq!(state.limit(), 1);
        assert!(state.next_launch().is_some());
        assert!(state.next_launch().is_none());
    }

    #[test]
    fn test_first_failure_stops_launching() {
        let mut state = RunState::new(jobs(4), 2);
        state.next_launch();
        state.next_launch();

        assert_eq!(state.complete(1, "c1.json", &ProcessExit::Exited(2)), Completion::Failed);
        assert!(state.next_launch().is_none());
        assert!(!state.is_finished());

        // A later failure does not replace the first one.
        assert_eq!(
            state.complete(0, "c0.json", &ProcessExit::Exited(7)),
            Completion::AfterFailure
        );
        assert!(state.is_finished());
        assert_eq!(state.completed(), 2);
        assert_eq!(state.pending(), 2);

        let failure = state.into_failure().unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.exit, ProcessExit::Exited(2));
    }

    #[test]
    fn test_finishes_after_all_complete() {
        let mut state = RunState::new(jobs(2), 5);
        while let Some((index, job)) = state.next_launch() {
            assert!(!state.is_finished());
            state.complete(index, &job.collection, &ProcessExit::Exited(0));
        }
        assert!(state.is_finished());
        assert!(state.failure().is_none());
        assert_eq!(state.completed(), state.total());
    }

    #[test]
    fn test_failure_display_names_job() {
        let failure = JobFailure {
            index: 1,
            collection: "orders.json".to_string(),
            exit: ProcessExit::Exited(2),
        };
        assert_eq!(failure.to_string(), "Job 2 failed: orders.json (exit 2)");
    }
}
