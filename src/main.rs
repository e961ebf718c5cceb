//! Backup Janitor CLI
//!
//! A command-line tool that cleans up old and broken backup generations.

use backup_janitor::cli::{
    args::{Cli, Commands},
    commands::{cleanup, dry_run},
};
use backup_janitor::models::config::{default_config_path, load_config};
use backup_janitor::services::command::ProcessRunner;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    if let Commands::Version = cli.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path)?;
    let runner = ProcessRunner::new()?;

    match cli.command {
        Commands::DryRun { profile, format } => {
            dry_run::dry_run(
                &config,
                &runner,
                profile.as_deref(),
                format,
                cli.skip_preflight,
            )?;
        }

        Commands::Cleanup { profile } => {
            let success =
                cleanup::cleanup(&config, &runner, profile.as_deref(), cli.skip_preflight)?;
            if !success {
                std::process::exit(1);
            }
        }

        Commands::Version => {}
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("backup_janitor=debug")
    } else {
        EnvFilter::new("backup_janitor=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
