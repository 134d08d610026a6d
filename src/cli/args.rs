//! Command-line argument definitions for the X-Plane `.dat` reader
//!
//! This module defines the CLI interface using the clap derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the X-Plane data file reader
///
/// Reads X-Plane aeronautical data files (apt.dat, nav.dat, awy.dat,
/// fix.dat) and exposes their contents as vector layers.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "xplane-dat",
    version,
    about = "Inspect and dump X-Plane apt/nav/awy/fix data files",
    long_about = "Reads the X-Plane family of aeronautical data files and exposes airports, \
                  runways, navaids, airways and fixes as vector layers. Files are validated \
                  against the known version strings of each format; malformed records are \
                  skipped with a debug log rather than aborting the file."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Probe a file and report its format, version and per-layer feature counts
    Info(InfoArgs),
    /// Dump the features of a file, or of a single layer, as text or JSON
    Dump(DumpArgs),
    /// Scan a directory for recognizable X-Plane data files
    Scan(ScanArgs),
}

/// Arguments for the info command
#[derive(Debug, Clone, Parser)]
pub struct InfoArgs {
    /// Path to an X-Plane .dat file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the dump command
#[derive(Debug, Clone, Parser)]
pub struct DumpArgs {
    /// Path to an X-Plane .dat file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Dump only the named layer (see `info` for layer names)
    #[arg(short = 'l', long = "layer", value_name = "NAME")]
    pub layer: Option<String>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Stream records lazily instead of reading the whole file up front.
    /// Implied for a single --layer dump; requires --layer.
    #[arg(long = "streaming")]
    pub streaming: bool,
}

/// Arguments for the scan command
#[derive(Debug, Clone, Parser)]
pub struct ScanArgs {
    /// Directory to scan for *.dat files
    #[arg(value_name = "DIR")]
    pub directory: PathBuf,
}

/// Output formats for the dump command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One feature per line with field names
    Text,
    /// One JSON object per feature
    Json,
}
