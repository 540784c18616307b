//! Command line argument parsing for the anketa CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// anketa - dictionary-driven classification of survey answers
#[derive(Parser, Debug, Clone)]
#[command(name = "anketa")]
#[command(about = "Classify free-text survey answers into categories")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct AnketaArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl AnketaArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify answer columns of a survey table
    Classify(ClassifyArgs),

    /// Show how a single answer is analyzed and resolved
    Inspect(InspectArgs),
}

/// Arguments for classifying a table
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Survey table (CSV with a header row)
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// 1-based numbers of the answer columns
    #[arg(value_name = "COLUMN", required = true)]
    pub columns: Vec<usize>,

    /// Classifier configuration (JSON)
    #[arg(short, long, value_name = "FILE", env = "ANKETA_CONFIG")]
    pub config: PathBuf,

    /// Directory for the output tables
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Field delimiter of the input table
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Field delimiter of the output tables
    #[arg(long, default_value = "tab", value_parser = parse_delimiter)]
    pub output_delimiter: u8,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, default_value = "0", env = "ANKETA_JOBS")]
    pub jobs: usize,
}

/// Arguments for inspecting one answer
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Answer text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Classifier configuration (JSON)
    #[arg(short, long, value_name = "FILE", env = "ANKETA_CONFIG")]
    pub config: PathBuf,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

/// Parse a single-byte delimiter; `tab` and `\t` stand for the tab character.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got {value:?}")),
        },
    }
}
