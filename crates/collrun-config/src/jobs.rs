//! Job list construction.

use crate::{CollectionEntry, ConfigError, ConfigResult, RunnerConfig};
use collrun_core::Job;
use std::path::Path;

/// Build the ordered job list from a validated configuration.
pub fn build_jobs(config: &RunnerConfig) -> ConfigResult<Vec<Job>> {
    let jobs: Vec<Job> = config.collections.iter().map(entry_to_job).collect();

    if jobs.is_empty() {
        return Err(ConfigError::NoCollections);
    }

    Ok(jobs)
}

fn entry_to_job(entry: &CollectionEntry) -> Job {
    match entry {
        CollectionEntry::Path(path) => Job::new(resolve_if_file(path)),
        CollectionEntry::Spec(spec) => {
            let collection = spec
                .collection
                .as_deref()
                .or(spec.path.as_deref())
                .unwrap_or_default();
            Job {
                collection: resolve_if_file(collection),
                environment: spec.environment.clone(),
                output: spec.output.clone(),
            }
        }
    }
}

/// Make existing `.json` paths absolute; leave anything else (e.g. cloud ids) as is.
fn resolve_if_file(value: &str) -> String {
    if value.ends_with(".json") && Path::new(value).exists() {
        if let Ok(absolute) = std::path::absolute(value) {
            return absolute.to_string_lossy().into_owned();
        }
    }
    value.to_string()
}
