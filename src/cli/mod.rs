//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cellito",
    version,
    about = "Retrieval core for the Cellito intranet knowledge assistant",
    long_about = "Cellito processes a collection of knowledge-base articles into retrieval \
                  chunks, ranks them against free-text questions, and assembles the grounding \
                  context used by the answering assistant."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/cellito/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a document collection and print corpus statistics
    Process {
        /// Path to a JSON array of documents ({"fileName", "text", ...})
        #[arg(short, long, value_name = "FILE")]
        documents: PathBuf,

        /// Print the resulting status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search a document collection and print the grounding context
    Search {
        /// Search query text
        query: String,

        /// Path to a JSON array of documents ({"fileName", "text", ...})
        #[arg(short, long, value_name = "FILE")]
        documents: PathBuf,

        /// Maximum number of chunks to return (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the full search result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
