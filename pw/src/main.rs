//! PathWatch - repository path change notifier
//!
//! CLI entry point: one pass over the configured watch-list, then exit.

use std::process::ExitCode;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{error, info};

use pathwatch::cli::Cli;
use pathwatch::config::EnvSnapshot;
use pathwatch::run_once;

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = parse_level(cli_log_level);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    info!(config_dir = %cli.config_dir.display(), "pathwatch starting");

    let env = EnvSnapshot::capture();
    match run_once(&cli.config_dir, &env).await {
        Ok(summary) => {
            println!("{} {}", "✓".green(), summary);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            eprintln!("{} {}", "✗".red(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
