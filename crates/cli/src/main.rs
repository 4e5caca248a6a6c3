//! RocketShoes CLI - Drive the cart store from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cli show
//!
//! # Add, update and remove products
//! rs-cli add 1
//! rs-cli update 1 3
//! rs-cli remove 1
//!
//! # Delete the persisted cart
//! rs-cli clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print the persisted cart
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product
//! - `update` - Set a product's amount (zero or less is ignored)
//! - `clear` - Delete the persisted cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_cart::CartConfig;
use rocketshoes_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the persisted cart
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product ID
        product_id: ProductId,
    },
    /// Set a product's amount
    Update {
        /// Catalog product ID
        product_id: ProductId,

        /// New amount (zero or less leaves the cart unchanged)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Delete the persisted cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cli=info,rocketshoes_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;

    match cli.command {
        Commands::Show => commands::cart::show(&config),
        Commands::Add { product_id } => commands::cart::add(&config, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(&config, product_id).await?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(&config, product_id, amount).await?;
        }
        Commands::Clear => commands::cart::clear(&config)?,
    }
    Ok(())
}
