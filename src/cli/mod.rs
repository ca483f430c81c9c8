//! CLI interface for vmatch.
//!
//! Provides command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for vmatch.
#[derive(Parser)]
#[command(name = "vmatch")]
#[command(author, version, about = "Fuzzy vehicle fuel-efficiency lookup", long_about = None)]
pub struct Cli {
    /// Dataset CSV file (overrides the configured path).
    #[arg(short, long, global = true)]
    pub dataset: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Find the vehicles closest to a partial make/model/year description.
    Search {
        /// Vehicle make (e.g., "Chevrolet"). Matched case-sensitively.
        #[arg(short = 'M', long)]
        make: Option<String>,

        /// Vehicle model (e.g., "Bolt"). Matched case-sensitively.
        #[arg(short, long)]
        model: Option<String>,

        /// Model year.
        #[arg(short, long, allow_negative_numbers = true)]
        year: Option<i32>,

        /// Print results as a JSON array.
        #[arg(short, long)]
        json: bool,
    },

    /// Load the dataset and report what it contains.
    Validate,

    /// Start the MCP server for AI editor integration.
    #[cfg(feature = "mcp")]
    Serve,
}
