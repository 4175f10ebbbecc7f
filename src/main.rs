//! statuswatch CLI
//!
//! Watches configured status pages, detects new incident updates, and prints
//! deduplicated notifications to the console.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use statuswatch::error::Result;
use statuswatch::models::Config;
use statuswatch::pipeline::{run_monitor, run_once};

/// statuswatch - Status Page Incident Monitor
#[derive(Parser, Debug)]
#[command(name = "statuswatch", version, about = "Status page incident monitor")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll all pages (and serve webhooks when enabled) until interrupted
    Run,

    /// Run a single poll pass over every page and exit
    Once,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("statuswatch starting...");

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run => {
            config.validate()?;
            run_monitor(config).await?;
        }

        Command::Once => {
            config.validate()?;
            let count = run_once(config).await?;
            log::info!("Done: {} new update(s)", count);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} pages, webhook {})",
                config.pages.len(),
                if config.webhook.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
    }

    Ok(())
}
