//! amz-price - Amazon product price lookup service
//!
//! Serves `GET /get_price/{asin}` and records every price in SQLite.

use amz_price::amazon::AmazonClient;
use amz_price::commands::{PriceCommand, PriceResponse};
use amz_price::config::Config;
use amz_price::server::{self, AppState};
use amz_price::store::ProductStore;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "amz-price",
    version,
    about = "Amazon product price lookup service",
    long_about = "Fetches Amazon product pages by ASIN, extracts the current price and keeps the latest value per product in a local SQLite database."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides AMZ_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on (e.g., 127.0.0.1:8000; overrides AMZ_LISTEN)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Look up and store the price of one product
    #[command(alias = "p")]
    Price {
        /// ASIN to look up
        asin: String,
    },

    /// Show the stored record for a product
    Show {
        /// ASIN to show
        asin: String,
    },

    /// Create the database and product table
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let store = ProductStore::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    let result = run(cli.command, config, store.clone()).await;
    store.close().await;
    result
}

async fn run(command: Commands, mut config: Config, store: ProductStore) -> Result<()> {
    match command {
        Commands::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }

            let client = AmazonClient::new(&config).context("Failed to create HTTP client")?;
            let state = AppState::new(Arc::new(client), PriceCommand::new(store));

            server::serve(&config.listen_addr, state, server::shutdown_signal()).await?;
        }

        Commands::Price { asin } => {
            let client = AmazonClient::new(&config).context("Failed to create HTTP client")?;
            let cmd = PriceCommand::new(store);

            let response = cmd.lookup(&client, &asin).await;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if let PriceResponse::Failed(err) = response {
                anyhow::bail!("{}", err.text);
            }
        }

        Commands::Show { asin } => match store.get(&asin.trim().to_uppercase()).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => anyhow::bail!("No stored price for {}", asin),
        },

        Commands::InitDb => {
            println!("Database ready at {}", config.database_path.display());
        }
    }

    Ok(())
}
