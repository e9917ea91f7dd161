//! Core domain types and traits for collrun.
//!
//! This crate contains:
//! - Job and run configuration types
//! - The export reporter vocabulary
//! - The process launcher trait and its completion values

pub mod executor;
pub mod job;

pub use executor::{Launcher, ProcessExit, ProcessSpec};
pub use job::{DEFAULT_RUNNER, ExportKind, Job, RunConfig};
