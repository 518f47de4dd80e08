//! Reprobe - Ordered-fallback artifact resolver
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use reprobe::cli::{Cli, Commands};
use reprobe::config::{Config, ConfigManager};
use reprobe::error::ReprobeResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ReprobeResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Init and path must work even when the config file is broken
    let skip_load = matches!(&cli.command, Commands::Config(args) if !args.needs_config());
    if skip_load {
        init_logging(cli.verbose, false);
        if let Commands::Config(args) = cli.command {
            return reprobe::cli::commands::config(args, &Config::default(), &config_manager)
                .await;
        }
    }

    // The log format comes from the config file, so load it first
    let config = config_manager.load().await?;
    init_logging(cli.verbose, config.general.log_format == "json");

    if config_manager.path().exists() {
        debug!("Loaded config from {}", config_manager.path().display());
    } else {
        debug!(
            "Config file not found at {}, using defaults",
            config_manager.path().display()
        );
    }

    match cli.command {
        Commands::Resolve(args) => reprobe::cli::commands::resolve(args, &config).await,
        Commands::Config(args) => {
            reprobe::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Install the subscriber: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("reprobe=warn"),
        1 => EnvFilter::new("reprobe=info"),
        _ => EnvFilter::new("reprobe=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }
}
