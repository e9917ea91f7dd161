//! Job scheduling for collrun.
//!
//! Builds runner invocations for each job and dispatches them to a
//! launcher, either one at a time or with a bounded number in flight.

pub mod command;
pub mod error;
pub mod scheduler;
pub mod state;

pub use command::build_command;
pub use error::SchedulerError;
pub use scheduler::{JobFailure, RunEvent, RunOutcome, RunScheduler, RunSummary};
pub use state::{Completion, RunState};
