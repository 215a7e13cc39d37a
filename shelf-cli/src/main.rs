//! Shelf CLI - Command-line interface for a personal book library

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shelf_core::ShelfConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about = "Manage a personal book library and favorites", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Active user identity (overrides SHELF_USER)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Data directory (overrides SHELF_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to the library
    Add {
        /// Book title
        #[arg(long)]
        title: Option<String>,

        /// Author name
        #[arg(long)]
        author: Option<String>,

        /// Publication year
        #[arg(long)]
        year: Option<String>,

        /// Cover image URI
        #[arg(long, default_value = "")]
        cover: String,

        /// Summary text
        #[arg(long, default_value = "")]
        summary: String,

        /// Explicit book id (defaults to the current time in milliseconds)
        #[arg(long)]
        id: Option<String>,
    },

    /// List the library, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List favorite books
    Favorites {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle the favorite state of a library book
    Favorite {
        /// Book id
        id: String,
    },

    /// Remove a book from the library and favorites
    Remove {
        /// Book id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "shelf_cli=debug,shelf_core=debug"
    } else {
        "shelf_cli=info,shelf_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ShelfConfig::from_env();
    if let Some(user) = cli.user {
        config = config.with_user(user);
    }
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }

    match cli.command {
        Commands::Add {
            title,
            author,
            year,
            cover,
            summary,
            id,
        } => {
            let draft = commands::BookDraft {
                id,
                title,
                author,
                year,
                cover,
                summary,
            };
            commands::add(&config, draft).await
        }

        Commands::List { json } => commands::list(&config, json).await,

        Commands::Favorites { json } => commands::favorites(&config, json).await,

        Commands::Favorite { id } => commands::favorite(&config, &id).await,

        Commands::Remove { id } => commands::remove(&config, &id).await,
    }
}
