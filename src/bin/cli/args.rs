//! CLI Argument Structures
//!
//! Flag names follow the Go tool this replaces (`--outputFile`,
//! `--outputDir`); kebab-case spellings are accepted as aliases.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Function-level coverage summaries for Go coverage profiles
#[derive(Parser, Debug)]
#[command(name = "go-ext-cover")]
#[command(version = VERSION)]
#[command(about = "Summarize a Go coverage profile into line and function coverage")]
#[command(long_about = "
Read a Go coverage profile, locate every source file it names, and write a
JSON summary of covered and missed statements and functions.

Common Usage:

  # Summarize coverage.out into coverage.json
  go test -coverprofile=coverage.out ./...
  go-ext-cover

  # Custom input and output locations
  go-ext-cover -f build/cover.out -d reports -o go-coverage.json

  # Module checked out somewhere other than the working directory
  go-ext-cover --module-root ./services/api
")]
pub struct Cli {
    /// Coverage profile to read [default: coverage.out]
    #[arg(short = 'f', long = "file", env = "GO_EXT_COVER_FILE", value_name = "PROFILE")]
    pub file: Option<PathBuf>,

    /// Report file name [default: coverage.json]
    #[arg(
        short = 'o',
        long = "outputFile",
        visible_alias = "output-file",
        env = "GO_EXT_COVER_OUTPUT_FILE",
        value_name = "NAME"
    )]
    pub output_file: Option<String>,

    /// Directory for the report, created if missing [default: current directory]
    #[arg(
        short = 'd',
        long = "outputDir",
        visible_alias = "output-dir",
        env = "GO_EXT_COVER_OUTPUT_DIR",
        value_name = "DIR"
    )]
    pub output_dir: Option<PathBuf>,

    /// YAML configuration file (defaults to .go-ext-cover.yml when present)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory containing go.mod [default: .]
    #[arg(short = 'r', long = "module-root", value_name = "DIR")]
    pub module_root: Option<PathBuf>,

    /// Enable verbose logging for debugging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

/// Log line format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl Cli {
    /// Default filter directive when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
