//! collrun CLI tool.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "collrun")]
#[command(about = "Run API test collections through the Postman CLI, in parallel", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(
        short,
        long,
        global = true,
        env = "COLLRUN_CONFIG",
        default_value = "./config.json"
    )]
    config: String,

    /// Show detailed logs
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured collections (default)
    Run,
    /// Validate a config file
    Validate {
        /// Config file to check (defaults to --config)
        path: Option<String>,
    },
    /// List the collections a config file would run
    List {
        /// Config file to read (defaults to --config)
        path: Option<String>,
    },
    /// Check the runner binary and local config files
    Doctor,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            commands::run::run(&cli.config).await?;
        }
        Commands::Validate { path } => {
            commands::validate(path.as_deref().unwrap_or(&cli.config))?;
        }
        Commands::List { path } => {
            commands::list(path.as_deref().unwrap_or(&cli.config))?;
        }
        Commands::Doctor => {
            commands::doctor().await?;
        }
    }

    Ok(())
}
