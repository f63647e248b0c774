//! Bundle canary CLI
//!
//! Local execution entry point. For AWS Lambda, use `bundle-canary-lambda`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use bundle_canary::{
    config::Config,
    error::Result,
    pipeline::{Canary, check_message},
    services::ConsolePublisher,
    storage::{LocalObjectStore, MemoryObjectStore, ObjectStore},
    utils::http::HttpFetcher,
};
use clap::{Parser, Subcommand};

/// Topic name used when printing to the console.
const CONSOLE_TOPIC: &str = "console";

/// Bundle canary - texts you when Humble Bundle changes
#[derive(Parser, Debug)]
#[command(
    name = "bundle-canary",
    version,
    about = "Watches Humble Bundle for new bundles"
)]
struct Cli {
    /// Optional TOML configuration file (environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the bundle pages and print the notification that would be sent
    Preview,

    /// Run the canary against a local snapshot directory, printing the notification
    Run {
        /// Directory holding the daily snapshots
        #[arg(long, default_value = "snapshots")]
        store_dir: PathBuf,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Config {
    let mut config = match path {
        Some(path) => {
            let config = Config::load_or_default(path);
            log::info!("Loaded configuration from {}", path.display());
            config
        }
        None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    config
}

fn build_canary(mut config: Config, store: Arc<dyn ObjectStore>) -> Result<Canary> {
    config.topic_arn.get_or_insert_with(|| CONSOLE_TOPIC.to_string());
    let fetcher = HttpFetcher::from_config(&config.scraper)?;
    Canary::new(config, Arc::new(fetcher), store, Arc::new(ConsolePublisher))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_ref());

    match cli.command {
        Command::Preview => {
            let canary = build_canary(config, Arc::new(MemoryObjectStore::new()))?;
            let preview = canary.preview().await?;

            for (category, topics) in preview.topics.iter() {
                println!("{} ({})", category.name().to_uppercase(), topics.len());
                for topic in topics {
                    println!("  {topic}");
                }
            }
            println!();
            println!("{}", preview.message);
            println!("({} characters)", preview.message.chars().count());

            if let Err(e) = check_message(&preview.message) {
                log::warn!("This notification would not be sent: {}", e);
            }
        }

        Command::Run { store_dir } => {
            log::info!("Using snapshot directory {}", store_dir.display());
            let store = Arc::new(LocalObjectStore::new(store_dir));
            let canary = build_canary(config, store)?;

            if !canary.run().await {
                log::error!("Canary run failed");
                return Ok(ExitCode::FAILURE);
            }
            log::info!("Canary run complete");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            if config.topic_arn.is_none() {
                log::warn!("SNS_TOPIC_ARN is not set; notifications will fail to send");
            }
            log::info!("✓ Config OK (bucket {})", config.bucket);
        }
    }

    Ok(ExitCode::SUCCESS)
}
