//! # Sipur CLI
//!
//! The `sipur` binary drives the bilingual story ingestion pipeline.
//!
//! ## Usage
//!
//! ```bash
//! sipur --config ./sipur.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sipur init` | Create the SQLite database and run schema migrations |
//! | `sipur ingest` | Ingest one English/Hebrew document pair |
//! | `sipur embed pending` | Backfill missing embeddings |
//! | `sipur repair` | Audit stored Hebrew fields for encoding artifacts |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! sipur init --config ./sipur.toml
//!
//! # Ingest a document pair, report only
//! sipur ingest --english stories_en.docx --hebrew stories_he.docx --dry-run
//!
//! # Ingest and publish
//! sipur ingest --english stories_en.docx --hebrew stories_he.docx --publish
//!
//! # Backfill embeddings for stories missing them
//! sipur embed pending --limit 200
//!
//! # Audit Hebrew fields, then rewrite the flagged ones
//! sipur repair
//! sipur repair --apply
//! ```

mod config;
mod dates;
mod db;
mod embed_cmd;
mod embedding;
mod extract;
mod ingest;
mod markers;
mod merge;
mod migrate;
mod models;
mod parse_en;
mod parse_he;
mod repair;
mod repair_cmd;
mod segment;
mod sink;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sipur — ingestion and normalization pipeline for a bilingual
/// (Hebrew/English) story archive.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/sipur.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "sipur",
    about = "Sipur — ingestion pipeline for a bilingual (Hebrew/English) story archive",
    version,
    long_about = "Sipur parses parallel English and Hebrew story documents, joins the two \
    languages by their shared story IDs, normalizes dates and Hebrew text, computes embeddings, \
    and upserts the merged records into SQLite."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./sipur.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the stories table. This command
    /// is idempotent — running it multiple times is safe.
    Init,

    /// Ingest one English/Hebrew document pair.
    ///
    /// Extracts both documents, splits them into per-story blocks, parses
    /// and merges the two languages by story ID, normalizes dates, repairs
    /// Hebrew text, embeds bodies (when configured), and upserts the
    /// records. Re-ingesting the same pair overwrites rows, never
    /// duplicates them.
    Ingest {
        /// Path to the English document (.docx, .pdf, or plain text).
        #[arg(long)]
        english: PathBuf,

        /// Path to the Hebrew document (.docx, .pdf, or plain text).
        #[arg(long)]
        hebrew: PathBuf,

        /// Parse and merge, report counts, write nothing.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of merged records to keep.
        #[arg(long)]
        limit: Option<usize>,

        /// Mark upserted stories as published.
        #[arg(long)]
        publish: bool,
    },

    /// Manage embedding vectors.
    Embed {
        #[command(subcommand)]
        action: EmbedAction,
    },

    /// Audit stored Hebrew fields for encoding artifacts.
    ///
    /// Without `--apply`, only reports which stories and fields are flagged.
    Repair {
        /// Rewrite flagged fields in place.
        #[arg(long)]
        apply: bool,
    },
}

/// Embedding management subcommands.
#[derive(Subcommand)]
enum EmbedAction {
    /// Embed stories that have a body but no embedding yet.
    Pending {
        /// Maximum number of stories to embed in this run.
        #[arg(long)]
        limit: Option<usize>,

        /// Override the batch size from config (number of texts per API call).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Show counts without performing any embedding.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            english,
            hebrew,
            dry_run,
            limit,
            publish,
        } => {
            ingest::run_ingest(&cfg, &english, &hebrew, dry_run, limit, publish).await?;
        }
        Commands::Embed { action } => match action {
            EmbedAction::Pending {
                limit,
                batch_size,
                dry_run,
            } => {
                embed_cmd::run_embed_pending(&cfg, limit, batch_size, dry_run).await?;
            }
        },
        Commands::Repair { apply } => {
            repair_cmd::run_repair(&cfg, apply).await?;
        }
    }

    Ok(())
}
