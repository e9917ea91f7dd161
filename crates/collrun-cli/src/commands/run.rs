//! Collection run command.

use anyhow::{Context, Result};
use collrun_config::{build_jobs, load_config};
use collrun_executor::ProcessLauncher;
use collrun_scheduler::{RunEvent, RunOutcome, RunScheduler};
use std::sync::Arc;
use tracing::debug;

/// Run every collection in the config file.
pub async fn run(config_path: &str) -> Result<()> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!();
            eprintln!("💡 Quick fixes:");
            eprintln!("   1. Validate config: collrun validate {}", config_path);
            eprintln!("   2. Check setup: collrun doctor");
            eprintln!("   3. Check help: collrun --help");
            eprintln!();
            anyhow::bail!("could not load config {}", config_path);
        }
    };

    let jobs = build_jobs(&config)
        .with_context(|| format!("Failed to build job list from {}", config_path))?;
    let run_config = config
        .run_config()
        .context("Failed to resolve results folder")?;

    println!("📂 Found {} collection(s):", jobs.len());
    for job in &jobs {
        println!("   {}", job.collection);
    }
    debug!(?run_config, "Resolved run configuration");

    let scheduler = RunScheduler::new(Arc::new(ProcessLauncher::new()), run_config);
    let (mut rx, result_handle) = scheduler.execute(jobs);

    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::JobStarted { index, collection } => {
                println!("▶ [{}] Starting {}", index + 1, collection);
            }
            RunEvent::JobSucceeded { index, collection } => {
                println!("✅ [{}] Finished {}", index + 1, collection);
            }
            RunEvent::JobFailed {
                index,
                collection,
                exit,
            } => {
                eprintln!("❌ [{}] Job failed: {} ({})", index + 1, collection, exit);
            }
            RunEvent::JobFinishedAfterFailure {
                index,
                collection,
                exit,
            } => {
                println!("   [{}] {} ended after failure ({})", index + 1, collection, exit);
            }
            RunEvent::RunCompleted { .. } => {}
        }
    }

    let outcome = result_handle
        .await
        .context("Run task failed")?
        .context("Failed to start run")?;

    match outcome {
        RunOutcome::Success(summary) => {
            let elapsed = summary.finished_at - summary.started_at;
            println!(
                "🎉 All collections completed ({} in {:.1}s)",
                summary.completed,
                elapsed.num_milliseconds() as f64 / 1000.0
            );
            Ok(())
        }
        RunOutcome::Failed(failure) => anyhow::bail!("{}", failure),
    }
}
