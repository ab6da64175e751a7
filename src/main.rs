//! Meme Scanner - memecoin signal pipeline over DexScreener data
//!
//! # WARNING
//! - Signals are heuristics, not financial advice.
//! - Most memecoins go to zero (rug pulls, abandonment).

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use meme_scanner::cli::commands;
use meme_scanner::config::Config;

/// Meme Scanner - thematic momentum, strategy filters and smart money scoring
#[derive(Parser)]
#[command(name = "meme-scanner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scan cycle
    Scan {
        /// Search term (repeatable). Replaces the configured terms
        #[arg(short, long = "term")]
        terms: Vec<String>,

        /// Candidates shown per profile
        #[arg(long)]
        top: Option<usize>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan on an interval, keeping momentum across cycles
    Watch {
        /// Seconds between cycles
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Show tracked wallets, categories and profiles
    Stats,

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("meme_scanner=info".parse()?),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Scan { terms, top, json } => commands::scan(&config, terms, top, json).await,
        Commands::Watch { interval_secs } => commands::watch(&config, interval_secs).await,
        Commands::Stats => commands::stats(&config).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
