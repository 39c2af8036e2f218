//! CLI argument parsing for flatstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flatstore")]
#[command(
    author,
    version,
    about = "Lookup and search over a remote delimited flat file",
    long_about = None
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the object store (overrides the config file)
    #[arg(short, long)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one record through the offset index
    Lookup {
        /// Record key (the leading field)
        #[arg(required = true)]
        key: String,
    },

    /// Search the corpus for lines containing every term
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Matches to skip before collecting
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Comma-separated field names to match against (default: whole line)
        #[arg(short, long)]
        fields: Option<String>,
    },

    /// Find one record by streaming the corpus, without the index
    ScanKey {
        /// Record key (the leading field)
        #[arg(required = true)]
        key: String,
    },
}
