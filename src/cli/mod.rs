//! CLI module for agentic-rag
//!
//! Provides subcommands:
//! - `ask`: interactive question answering (or one question with `--question`)
//! - `ingest`: build or update the local vector index from files

pub mod ask;
pub mod ingest;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Agentic RAG - self-correcting question answering over your documents
#[derive(Parser, Debug)]
#[command(name = "agentic-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask questions against the index
    Ask(ask::AskArgs),

    /// Add files to the index
    Ingest(ingest::IngestArgs),
}

/// Load `.env` and the layered configuration, then start logging
fn bootstrap(config_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load(config_path)?;
    logging::init_logging(&config.logging);

    Ok(config)
}
