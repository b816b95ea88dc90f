//! CLI logic for the Trellis diagram tool.
//!
//! This module contains the core CLI logic: it loads configuration, reads a
//! diagram manifest, declares its topology through the `trellis` scope API and
//! either renders the artifacts or prints the DOT description.

pub mod error_adapter;
pub mod manifest;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;
use thiserror::Error;

use trellis::{TrellisError, export::dot, render::DotCommand};

use manifest::{Manifest, ManifestError};

/// Errors reported by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Trellis(#[from] TrellisError),

    /// The manifest could not be loaded; `src` is kept for snippets.
    #[error("{error}")]
    Manifest { error: ManifestError, src: String },
}

/// Run the Trellis CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Manifest errors (syntax, duplicate keys, unknown edge endpoints)
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(manifest_path = args.manifest; "Processing manifest");

    let app_config = config::load_config(args.config.as_ref())?;

    let src = fs::read_to_string(&args.manifest).map_err(TrellisError::from)?;
    let manifest = match Manifest::parse(&src) {
        Ok(manifest) => manifest,
        Err(error) => return Err(CliError::Manifest { error, src }),
    };

    let mut diagram_config = app_config.diagram().layered(manifest.diagram());
    if let Some(dir) = &args.output_dir {
        diagram_config = diagram_config.with_output_dir(dir);
    }
    if !args.formats.is_empty() {
        diagram_config = diagram_config.with_formats(args.formats.iter().copied());
    }
    if args.emit_only {
        diagram_config = diagram_config.with_render(false);
    }

    let engine = DotCommand::from_config(app_config.engine());
    let output = manifest.build(diagram_config, engine)?;

    if args.emit_only {
        print!("{}", dot::emit(output.diagram())?);
        return Ok(());
    }

    for artifact in output.artifacts() {
        info!(artifact = artifact.display().to_string(); "Artifact exported");
    }

    Ok(())
}
