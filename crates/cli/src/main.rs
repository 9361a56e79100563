//! Gemline CLI - Catalog seeding and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Create products from a YAML file in the configured content store
//! gemline seed products data/products.yaml
//!
//! # List the catalog the way an anonymous visitor sees it
//! gemline catalog list --search ring --sort price-low
//!
//! # List the catalog as a signed-in member, between $100 and $2000
//! gemline catalog list --member --min 100 --max 2000
//! ```
//!
//! # Commands
//!
//! - `seed products` - Validate and create product records
//! - `catalog list` - Run the catalog search, filter and sort pipeline

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use gemline_core::catalog::{DEFAULT_MAX_PRICE, SortKey};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "gemline")]
#[command(author, version, about = "Gemline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the content store
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create products from a YAML list
    Products {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products after search, price filter and sort
    List {
        /// Case-insensitive match on name, description and SKU
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort order (`newest`, `name`, `price-low`, `price-high`)
        #[arg(long, default_value_t = SortKey::Newest)]
        sort: SortKey,

        /// Lowest price, inclusive
        #[arg(long, default_value_t = Decimal::ZERO)]
        min: Decimal,

        /// Highest price, inclusive
        #[arg(long, default_value_t = DEFAULT_MAX_PRICE)]
        max: Decimal,

        /// Include products visible to signed-in members only
        #[arg(long)]
        member: bool,
    },
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
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                search,
                sort,
                min,
                max,
                member,
            } => {
                let args = commands::catalog::ListArgs {
                    search,
                    sort,
                    min,
                    max,
                    member,
                };
                commands::catalog::list(&args).await?;
            }
        },
    }
    Ok(())
}
