//! Galeria CLI - operator tools for carts, catalog and contact mail.
//!
//! # Usage
//!
//! ```bash
//! # Inspect a shopper's cart (file-backed, same files as the storefront)
//! galeria cart --cart 0b5e... show
//!
//! # Add two pieces of a catalog entry, then bump by three
//! galeria cart add obra-2 -q 2
//! galeria cart inc obra-2 -s 3
//!
//! # Browse
//! galeria catalog list --category posters --sort price-desc
//! galeria catalog gallery --technique oil
//!
//! # Contact form
//! galeria contact check -n Ana -e ana@galeria.art -m "Hola"
//! galeria contact send -n Ana -e ana@galeria.art -m "Hola"
//! ```
//!
//! # Commands
//!
//! - `cart` - Drive a file-backed cart
//! - `catalog` - List and query the built-in catalog
//! - `contact` - Validate or send a contact message

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use galeria_core::{Category, SortKey};

mod commands;

use commands::cart::CartAction;

#[derive(Parser)]
#[command(name = "galeria")]
#[command(author, version, about = "Galeria CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a file-backed cart
    Cart {
        /// Snapshot directory
        #[arg(long, env = "CART_STORAGE_DIR", default_value = "carts")]
        dir: PathBuf,

        /// Cart id (the session's `cart_id`)
        #[arg(long, default_value = "cli")]
        cart: String,

        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Contact form tools
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List entries
    List {
        #[arg(short, long)]
        category: Option<Category>,
        /// Case-insensitive title search
        #[arg(short, long)]
        q: Option<String>,
        #[arg(short, long)]
        tag: Option<String>,
        /// relevance, price-asc, price-desc or newest
        #[arg(short, long, default_value = "relevance")]
        sort: SortKey,
    },
    /// List gallery artworks
    Gallery {
        /// oil, acrylic, mixed or ink
        #[arg(short, long)]
        technique: Option<String>,
    },
}

#[derive(Subcommand)]
enum ContactAction {
    /// Validate a submission without sending
    Check {
        #[command(flatten)]
        fields: ContactFields,
    },
    /// Send a message through the configured provider
    Send {
        #[command(flatten)]
        fields: ContactFields,
    },
}

#[derive(clap::Args)]
struct ContactFields {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    email: String,
    #[arg(short, long)]
    message: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Cart { dir, cart, action } => commands::cart::run(&dir, &cart, action)?,
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                category,
                q,
                tag,
                sort,
            } => commands::catalog::list(category, q, tag, sort),
            CatalogAction::Gallery { technique } => {
                commands::catalog::gallery(technique.as_deref());
            }
        },
        Commands::Contact { action } => match action {
            ContactAction::Check { fields } => {
                commands::contact::check(fields.name, fields.email, fields.message)?;
            }
            ContactAction::Send { fields } => {
                commands::contact::send(fields.name, fields.email, fields.message).await?;
            }
        },
    }
    Ok(())
}
