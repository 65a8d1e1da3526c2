//! ForAll Herbals CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! fh-cli migrate
//!
//! # Load the bundled sample catalog, testimonials and blog posts
//! fh-cli seed
//!
//! # Load sample data from a custom document
//! fh-cli seed --file ./catalog.yaml
//!
//! # Inspect the key-value store
//! fh-cli kv list product:
//! fh-cli kv get newsletter_stats
//! fh-cli kv del cart:3f0c...
//!
//! # Newsletter counters
//! fh-cli newsletter stats
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fh-cli")]
#[command(author, version, about = "ForAll Herbals CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Write sample data that is not present yet
    Seed {
        /// YAML document to load instead of the bundled sample data
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Inspect or edit the key-value store
    Kv {
        #[command(subcommand)]
        action: KvAction,
    },
    /// Newsletter reporting
    Newsletter {
        #[command(subcommand)]
        action: NewsletterAction,
    },
}

#[derive(Subcommand)]
enum KvAction {
    /// Print the values stored under one or more keys
    Get {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print every entry whose key starts with a prefix
    List { prefix: String },
    /// Delete one or more keys
    Del {
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

#[derive(Subcommand)]
enum NewsletterAction {
    /// Show subscriber counters
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file } => commands::seed::sample_data(file.as_deref()).await?,
        Commands::Kv { action } => match action {
            KvAction::Get { keys } => commands::kv::get(&keys).await?,
            KvAction::List { prefix } => commands::kv::list(&prefix).await?,
            KvAction::Del { keys } => commands::kv::del(&keys).await?,
        },
        Commands::Newsletter { action } => match action {
            NewsletterAction::Stats => commands::kv::newsletter_stats().await?,
        },
    }
    Ok(())
}
