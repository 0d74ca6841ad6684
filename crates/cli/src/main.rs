//! TechMart CLI - Catalog inspection and cart replay tools.
//!
//! # Usage
//!
//! ```bash
//! # List the built-in catalog
//! tm-cli catalog list
//!
//! # List a catalog file as JSON
//! tm-cli catalog list --catalog products.json --json
//!
//! # Replay cart events against a fresh cart
//! tm-cli cart replay add:1 add:2 add:1 set:2=0 checkout
//! ```
//!
//! # Commands
//!
//! - `catalog list` - Print the products in a catalog
//! - `cart replay` - Apply a sequence of cart events and print the outcomes

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tm-cli")]
#[command(author, version, about = "TechMart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Drive a cart from the command line
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List every product
    List {
        /// JSON catalog file (defaults to the built-in demo catalog)
        #[arg(short, long, env = "STOREFRONT_CATALOG_PATH")]
        catalog: Option<PathBuf>,

        /// Print the catalog as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Apply events to an empty cart and print each outcome plus the final summary
    Replay {
        /// JSON catalog file (defaults to the built-in demo catalog)
        #[arg(short, long, env = "STOREFRONT_CATALOG_PATH")]
        catalog: Option<PathBuf>,

        /// Events: `add:ID`, `remove:ID`, `inc:ID`, `dec:ID`, `set:ID=QTY`, `checkout`
        #[arg(required = true)]
        events: Vec<String>,
    },
}

fn main() {
    // Load .env so STOREFRONT_CATALOG_PATH can come from there
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techmart_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { catalog, json } => {
                let catalog = commands::load_catalog(catalog.as_deref())?;
                commands::catalog::list(&catalog, json, &mut stdout)?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Replay { catalog, events } => {
                let catalog = commands::load_catalog(catalog.as_deref())?;
                commands::cart::replay(catalog, &events, &mut stdout)?;
            }
        },
    }
    Ok(())
}
