//! Command-line argument definitions for the Trellis CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the manifest, override where and in which
//! formats artifacts are written, and control configuration and logging.

use clap::Parser;

use trellis::style::OutputFormat;

/// Command-line arguments for the Trellis diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the diagram manifest (TOML)
    #[arg(help = "Path to the diagram manifest")]
    pub manifest: String,

    /// Directory the artifacts are written to, overriding the manifest
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Output format (png, jpg, svg, pdf, dot); repeat for several
    #[arg(short = 'f', long = "format")]
    pub formats: Vec<OutputFormat>,

    /// Print the DOT description to stdout instead of rendering
    #[arg(long)]
    pub emit_only: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
