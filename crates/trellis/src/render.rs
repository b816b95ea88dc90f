//! Rendering DOT descriptions into artifact files.
//!
//! A [`RenderEngine`] turns a DOT description into one output file. The
//! default engine, [`DotCommand`], pipes the description into the Graphviz
//! `dot` program. With the `graphviz` feature enabled, `GraphvizEngine` does
//! the same through the `graphviz-rust` crate.
//!
//! Artifacts are produced in a temporary file next to their final location and
//! only renamed into place once the engine reports success, so a failed render
//! never leaves a partial file behind.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use log::{debug, info};
use thiserror::Error;

use trellis_core::style::OutputFormat;

use crate::{config::EngineConfig, error::TrellisError, structure::Diagram};

/// Errors raised by a render engine.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Engine(String),
}

/// Produces artifact files from DOT descriptions.
pub trait RenderEngine {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Renders `description` as `format` into the file at `output`.
    ///
    /// `output` already exists (it is an empty temporary file) and must be
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the description cannot be rendered.
    fn render(
        &self,
        description: &str,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), RenderError>;
}

/// Renders by running the Graphviz `dot` program.
#[derive(Debug, Clone)]
pub struct DotCommand {
    program: PathBuf,
}

impl Default for DotCommand {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl DotCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.program())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl RenderEngine for DotCommand {
    fn name(&self) -> &str {
        "dot"
    }

    fn render(
        &self,
        description: &str,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), RenderError> {
        debug!(program:% = self.program.display(), format:%, output:?; "Spawning Graphviz");
        let program = self.program.display().to_string();

        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", format.extension()))
            .arg("-o")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: program.clone(),
                source,
            })?;

        // The pipe is closed when `stdin` goes out of scope, letting dot finish.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(description.as_bytes()),
            None => Ok(()),
        };

        let result = child.wait_with_output()?;
        if !result.status.success() {
            return Err(RenderError::Failed {
                program,
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        written?;
        Ok(())
    }
}

#[cfg(feature = "graphviz")]
pub use graphviz::GraphvizEngine;

#[cfg(feature = "graphviz")]
mod graphviz {
    use std::path::Path;

    use graphviz_rust::{
        cmd::{CommandArg, Format},
        printer::PrinterContext,
    };

    use trellis_core::style::OutputFormat;

    use super::{RenderEngine, RenderError};

    /// Renders through the `graphviz-rust` crate.
    ///
    /// The description is parsed into a `graphviz-rust` graph first, so
    /// malformed input is reported before Graphviz runs.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct GraphvizEngine;

    impl RenderEngine for GraphvizEngine {
        fn name(&self) -> &str {
            "graphviz-rust"
        }

        fn render(
            &self,
            description: &str,
            format: OutputFormat,
            output: &Path,
        ) -> Result<(), RenderError> {
            let graph = graphviz_rust::parse(description).map_err(RenderError::Engine)?;
            let format = match format {
                OutputFormat::Png => Format::Png,
                OutputFormat::Jpg => Format::Jpg,
                OutputFormat::Svg => Format::Svg,
                OutputFormat::Pdf => Format::Pdf,
                OutputFormat::Dot => Format::Dot,
            };

            graphviz_rust::exec(
                graph,
                &mut PrinterContext::default(),
                vec![
                    CommandArg::Format(format),
                    CommandArg::Output(output.display().to_string()),
                ],
            )?;
            Ok(())
        }
    }
}

/// Writes one artifact per configured format and returns their paths.
///
/// The `dot` format is the description itself and bypasses the engine.
pub(crate) fn render_all(
    diagram: &Diagram,
    description: &str,
    engine: &dyn RenderEngine,
) -> Result<Vec<PathBuf>, TrellisError> {
    let config = diagram.config();
    let dir = match config.output_dir() {
        dir if dir.as_os_str().is_empty() => Path::new("."),
        dir => dir,
    };
    fs::create_dir_all(dir)?;

    let mut artifacts = Vec::with_capacity(config.formats().len());
    for &format in config.formats() {
        let path = config.output_path(format);
        let staged = tempfile::Builder::new()
            .prefix(".trellis-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(dir)?;

        if format == OutputFormat::Dot {
            fs::write(staged.path(), description)?;
        } else {
            engine
                .render(description, format, staged.path())
                .map_err(|err| TrellisError::render_failure(diagram.id(), format, err))?;
        }

        staged.persist(&path).map_err(|err| TrellisError::Io(err.error))?;
        info!(
            diagram:% = diagram.id(),
            engine = engine.name(),
            format:%,
            path:?;
            "Artifact written"
        );
        artifacts.push(path);
    }

    Ok(artifacts)
}
