//! JSON configuration parsing for collrun.
//!
//! This crate handles:
//! - Loading and validating the runner configuration file
//! - Building the ordered job list from it

pub mod error;
pub mod jobs;
pub mod runner;

pub use error::{ConfigError, ConfigResult};
pub use jobs::build_jobs;
pub use runner::{CollectionEntry, CollectionSpec, RunnerConfig, load_config, parse_config};
