//! Job and run configuration definitions.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Binary invoked for every job unless the configuration names another one.
pub const DEFAULT_RUNNER: &str = "postman";

/// One collection run to hand to the external runner.
///
/// Jobs are identified by their position in the job list, so two jobs may
/// point at the same collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Collection file path or cloud identifier.
    pub collection: String,
    /// Environment file or identifier for this job only.
    pub environment: Option<String>,
    /// Base name for exported report files.
    pub output: Option<String>,
}

impl Job {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            environment: None,
            output: None,
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Settings shared by every job of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Use the bounded-parallel policy instead of the sequential one.
    pub parallel: bool,
    /// Maximum simultaneously running jobs. 0 means the job count.
    pub max_concurrency: usize,
    /// Fallback environment for jobs without their own.
    pub environment: Option<String>,
    /// Reporter names, in order, without duplicates.
    pub reporters: Vec<String>,
    /// Directory receiving exported reports.
    pub results_dir: PathBuf,
    /// Program launched for each job.
    pub runner: String,
}

impl RunConfig {
    /// The concurrency cap actually enforced for a run of `total_jobs` jobs.
    pub fn effective_limit(&self, total_jobs: usize) -> usize {
        if self.max_concurrency > 0 {
            self.max_concurrency
        } else {
            total_jobs
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_concurrency: 0,
            environment: None,
            reporters: Vec::new(),
            results_dir: PathBuf::from("results"),
            runner: DEFAULT_RUNNER.to_string(),
        }
    }
}

/// Reporters whose output the runner can write to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ExportKind {
    #[display("json")]
    Json,
    #[display("html")]
    Html,
    #[display("junit")]
    Junit,
}

impl ExportKind {
    /// Match a reporter name, ignoring case.
    pub fn from_reporter(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            "junit" => Some(Self::Junit),
            _ => None,
        }
    }

    /// Flag that tells the runner where to write this report.
    pub fn export_flag(&self) -> String {
        format!("--reporter-{}-export", self)
    }
}
