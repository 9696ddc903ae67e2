//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// layerprobe -- inspect a directory tree and record its software composition.
///
/// Use `layerprobe <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "layerprobe", version, about, long_about = None)]
pub struct Cli {
    /// Path to the layerprobe.toml configuration file.
    #[arg(short, long, default_value = "layerprobe.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect a directory tree and store the result in the cache.
    Inspect(InspectArgs),

    /// List registered analyzers.
    Analyzers,

    /// Print a stored blob record.
    Blob(BlobArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- inspect ----

/// Inspect a directory tree.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Root directory to inspect.
    pub path: PathBuf,

    /// Disable an analyzer by type tag (repeatable).
    #[arg(long = "disable", value_name = "TYPE")]
    pub disable: Vec<String>,

    /// Skip files whose relative path matches this regex (repeatable).
    #[arg(long = "skip-file", value_name = "RE")]
    pub skip_files: Vec<String>,

    /// Skip directories whose relative path matches this regex (repeatable).
    #[arg(long = "skip-dir", value_name = "RE")]
    pub skip_dirs: Vec<String>,

    /// Follow symlinks that stay inside the root.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Maximum number of files analyzed at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Maximum file size handed to analyzers (bytes).
    #[arg(long)]
    pub max_file_size: Option<usize>,

    /// Label for the resulting artifact reference.
    #[arg(long)]
    pub name: Option<String>,
}

// ---- blob ----

/// Print a stored blob record.
#[derive(Args, Debug)]
pub struct BlobArgs {
    /// Blob ID (sha256:<hex>).
    pub id: String,
}

// ---- config ----

/// Manage layerprobe configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, scan, cache).
        #[arg(long)]
        section: Option<String>,
    },
}
