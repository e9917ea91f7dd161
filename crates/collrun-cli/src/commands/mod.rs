//! CLI command implementations.

pub mod run;

use anyhow::Result;
use collrun_config::{RunnerConfig, build_jobs, load_config};
use collrun_core::Job;
use collrun_executor::{RUNNER_CANDIDATES, probe_runner};
use std::path::Path;

pub fn validate(path: &str) -> Result<()> {
    match load_config(path).and_then(|config| Ok((build_jobs(&config)?, config))) {
        Ok((jobs, config)) => {
            println!();
            println!("✅ Configuration is valid!");
            for line in summary_lines(path, &config, &jobs) {
                println!("{}", line);
            }
            println!();
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("  {}", e);
            eprintln!();
            eprintln!("💡 Quick fixes:");
            eprintln!("   1. Check the config file exists and is valid JSON");
            eprintln!("   2. Ensure all paths point to existing files");
            eprintln!();
            std::process::exit(1);
        }
    }
}

pub fn list(path: &str) -> Result<()> {
    let jobs = match load_config(path).and_then(|config| build_jobs(&config)) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("📂 Found {} collection(s):", jobs.len());
    for line in list_lines(&jobs) {
        println!("  {}", line);
    }
    println!();
    println!("Run \"collrun\" to execute these collections");
    println!();
    Ok(())
}

pub async fn doctor() -> Result<()> {
    println!();
    println!("🏥 Running diagnostic checks...");
    println!();

    let mut issues = false;

    match probe_runner(RUNNER_CANDIDATES).await {
        Some(runner) => {
            if runner.version.is_empty() {
                println!("✅ Postman CLI: installed");
            } else {
                println!("✅ Postman CLI: installed ({})", runner.version);
            }
            println!("   Binary: {}", runner.command);
        }
        None => {
            issues = true;
            println!("⚠️  Postman CLI: not found in PATH");
            println!("   Install it from https://learning.postman.com/docs/postman-cli/postman-cli-installation/");
            println!(
                "   PATH: {}",
                std::env::var("PATH").unwrap_or_else(|_| "(empty)".to_string())
            );
        }
    }

    let cwd = std::env::current_dir()?;
    match find_config_files(&cwd)?.first() {
        Some(name) => match load_config(cwd.join(name)) {
            Ok(_) => println!("✅ {}: valid", name),
            Err(e) => {
                issues = true;
                println!("❌ {}: invalid ({})", name, e);
            }
        },
        None => {
            issues = true;
            println!("⚠️  No config*.json file found");
            println!("   Create one next to your collections, then run: collrun validate");
        }
    }

    println!();
    if issues {
        println!("Diagnostic complete. Issues detected above.");
    } else {
        println!("Diagnostic complete. All systems operational! 🚀");
    }
    println!();
    Ok(())
}

fn summary_lines(path: &str, config: &RunnerConfig, jobs: &[Job]) -> Vec<String> {
    let absolute = std::path::absolute(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string());
    let reporters = config.reporter_list();

    vec![
        format!("📄 Config file: {}", absolute),
        format!("🚀 Collections to run: {}", jobs.len()),
        format!(
            "⚡ Parallel mode: {}",
            if config.parallel { "enabled" } else { "disabled" }
        ),
        format!(
            "🔢 Max concurrency: {}",
            match config.max_concurrency {
                0 => "0 (one per collection)".to_string(),
                n => n.to_string(),
            }
        ),
        format!(
            "📊 Reporters: {}",
            if reporters.is_empty() {
                "cli".to_string()
            } else {
                reporters.join(",")
            }
        ),
        format!("📁 Results folder: {}", config.results_folder()),
    ]
}

fn list_lines(jobs: &[Job]) -> Vec<String> {
    jobs.iter()
        .enumerate()
        .map(|(idx, job)| {
            let env = job
                .environment
                .as_deref()
                .map(|env| format!(" (env: {})", file_name(env)))
                .unwrap_or_default();
            format!("{}. {}{}", idx + 1, file_name(&job.collection), env)
        })
        .collect()
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// `config*.json` files in `dir`, sorted by name.
fn find_config_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("config") && name.ends_with(".json"))
        .collect();
    names.sort();
    Ok(names)
}
