//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect, check and save section-keyed YAML configuration
#[derive(Parser)]
#[command(
    name = "sectioncfg",
    version,
    about = "Inspect, check and save section-keyed YAML configuration",
    long_about = "Loads configuration sections through defaults, YAML documents and schema \
                  validation, and writes validated section documents."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to settings file
    #[arg(long, short = 's', global = true)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Output format for `show`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// YAML (default)
    #[default]
    Yaml,
    /// JSON
    Json,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Print a loaded section
    Show {
        /// Section name
        section: String,

        /// Output format
        #[arg(long, short = 'f', default_value = "yaml")]
        format: Format,
    },
    /// Load every section and report validation failures
    Check,
    /// Validate a YAML document and save it as a section
    Save {
        /// Section name
        section: String,

        /// YAML document to save
        file: PathBuf,
    },
    /// List the sections declared in the schema
    Sections,
    /// Generate default settings file
    Init {
        /// Path where to create the settings file
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,
    },
    /// Display version information
    Version,
}
