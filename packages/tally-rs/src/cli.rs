//! Command line arguments backing the `tally` binary.
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
  name = "tally",
  about = "Extract merchant, date, total and line items from receipt OCR output",
  version
)]
pub struct Args {
  /// Enable debug logging on stderr
  #[arg(long, short = 'v', global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// Extract a receipt record from a text-detection JSON payload
  Extract {
    /// Path to the OCR payload
    input: PathBuf,

    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Require aligned price columns and top-to-bottom items for spatial validation
    #[arg(long)]
    table_aware: bool,

    /// Date reported when the receipt has none (defaults to today)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Write the record to a file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
  },
  /// Print the reading lines detected in a payload
  Lines {
    /// Path to the OCR payload
    input: PathBuf,

    /// Drop words below this confidence before grouping
    #[arg(long, default_value = "0.0")]
    min_confidence: f32,

    /// Vertical-center tolerance in pixels
    #[arg(long, default_value = "10")]
    tolerance: f64,
  },
  /// Extract many payloads concurrently
  Batch {
    /// Paths to OCR payloads
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Number of files processed at once
    #[arg(long, short = 'n', default_value = "4")]
    max_concurrent: usize,

    /// Write the results to a file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
  },
  /// Write the default configuration as TOML
  Config {
    /// Destination file (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
  },
}
