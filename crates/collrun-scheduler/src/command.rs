//! Runner invocation for a single job.

use collrun_core::{ExportKind, Job, ProcessSpec, RunConfig};
use std::path::Path;

/// Build the runner command for the job at `index` (zero-based).
///
/// Exported reports are named after the job's `output`, or `result_<n>`
/// with `n` counted from 1, so concurrent jobs never share a file.
pub fn build_command(job: &Job, index: usize, results_dir: &Path, config: &RunConfig) -> ProcessSpec {
    let mut args = vec![
        "collection".to_string(),
        "run".to_string(),
        job.collection.clone(),
    ];

    if let Some(env) = job.environment.as_ref().or(config.environment.as_ref()) {
        args.push("-e".to_string());
        args.push(env.clone());
    }

    if !config.reporters.is_empty() {
        args.push("--reporters".to_string());
        args.push(config.reporters.join(","));
    }

    let base_name = job
        .output
        .clone()
        .unwrap_or_else(|| format!("result_{}", index + 1));

    for kind in config.reporters.iter().filter_map(|r| ExportKind::from_reporter(r)) {
        let path = results_dir.join(format!("{}.{}", base_name, kind));
        args.push(kind.export_flag());
        args.push(path.to_string_lossy().into_owned());
    }

    ProcessSpec::new(config.runner.clone(), args)
}
