//! kennel command-line entry point.
//!
//! Logging goes to stderr so command output on stdout stays pipeable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kennel_client::{Gallery, NetworkStatus};
use kennel_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "kennel")]
#[command(about = "Browse dog breeds and pictures, online or from the local cache", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Treat the network as unreachable and serve from the cache only
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List breeds, optionally filtered
    Breeds {
        /// Case-insensitive substring filter
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a sample of images for one breed
    Images {
        /// Breed name, as listed by `kennel breeds`
        breed: String,

        /// Index of the image to mark as selected
        #[arg(short, long)]
        image: Option<usize>,
    },

    /// Filter the breed list interactively, one search term per stdin line
    Browse,

    /// Cache maintenance
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Delete expired records
    Purge,
    /// Delete every record
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;

    tracing::info!(db = %config.db_path.display(), api = %config.api_base_url, "starting kennel");

    let store = commands::open_store(&config.db_path).await?;

    let gallery = Gallery::new(&config, store.clone(), NetworkStatus::fixed(!cli.offline))?;

    match cli.command {
        Commands::Breeds { search } => commands::breeds(&gallery, search.as_deref()).await,
        Commands::Images { breed, image } => commands::images(&gallery, &breed, image).await,
        Commands::Browse => commands::browse(&gallery, config.debounce()).await,
        Commands::Cache(CacheCommands::Purge) => commands::cache_purge(&store).await,
        Commands::Cache(CacheCommands::Clear) => commands::cache_clear(&store).await,
    }
}
