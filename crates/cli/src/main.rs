//! RocketShoes CLI - inspect and edit the local shopping cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 3
//! rs-cart add 3
//!
//! # Set product 3 to exactly 2 units
//! rs-cart update 3 2
//!
//! # Remove product 3
//! rs-cart remove 3
//! ```
//!
//! # Environment Variables
//!
//! See `rocketshoes_cart::config` - `ROCKETSHOES_API_URL` is required.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rocketshoes_cart::{ApiClient, CartConfig, CartStore, FileStore};
use rocketshoes_core::{CurrencyCode, ProductId};

mod commands;

use commands::cart::{CartCommand, execute, render, write_notice};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = concat!(
    "rocketshoes_cart=info,",
    env!("CARGO_CRATE_NAME"),
    "=info"
);

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product id
        product_id: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product id
        product_id: i64,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Catalog product id
        product_id: i64,

        /// New quantity (zero or less is ignored)
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
}

impl From<Commands> for CartCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Self::Show,
            Commands::Add { product_id } => Self::Add(ProductId::new(product_id)),
            Commands::Remove { product_id } => Self::Remove(ProductId::new(product_id)),
            Commands::Update { product_id, amount } => {
                Self::Update(ProductId::new(product_id), amount)
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Set up the store and run one command.
///
/// A rejected command is not an error here: its notice goes to stderr and
/// the exit code reports the failure.
async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let api = ApiClient::from_config(&config);
    let store = CartStore::initialize(
        api.clone(),
        api,
        FileStore::new(&config.cart_file),
        &config.storage_key,
    )?;

    match execute(&store, cli.command.into()).await {
        Ok(cart) => {
            print_out(&render(&cart, CurrencyCode::default()));
            Ok(ExitCode::SUCCESS)
        }
        Err(notice) => {
            write_notice(&mut std::io::stderr().lock(), &notice)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_out(text: &str) {
    println!("{text}");
}
