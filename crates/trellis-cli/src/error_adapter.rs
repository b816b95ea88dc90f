//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! A [`ManifestError`] may carry several issues; each one is rendered
//! independently, with a source snippet when its location is known.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use trellis::TrellisError;

use crate::{
    CliError,
    manifest::{ManifestError, ManifestIssue},
};

/// Adapter for a single manifest issue.
pub struct IssueAdapter<'a> {
    /// The wrapped issue
    issue: &'a ManifestIssue,
    /// Manifest source for displaying snippets
    src: &'a str,
}

impl<'a> IssueAdapter<'a> {
    /// Create a new issue adapter.
    pub fn new(issue: &'a ManifestIssue, src: &'a str) -> Self {
        Self { issue, src }
    }
}

impl fmt::Debug for IssueAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueAdapter")
            .field("issue", &self.issue)
            .finish()
    }
}

impl fmt::Display for IssueAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.issue, f)
    }
}

impl std::error::Error for IssueAdapter<'_> {}

impl MietteDiagnostic for IssueAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.issue {
            ManifestIssue::Syntax { .. } => "trellis::manifest::syntax",
            ManifestIssue::DuplicateKey { .. } => "trellis::manifest::duplicate_key",
            ManifestIssue::UnknownNode { .. } => "trellis::manifest::unknown_node",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.issue
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.issue
            .span()
            .map(|_| &self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.issue.span()?;
        let span = SourceSpan::new(span.start.into(), span.len());
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(self.issue.label().to_string()),
            span,
        ))))
    }
}

/// Adapter for [`TrellisError`].
///
/// Library errors carry no source location; they are reported with a stable
/// code and, where a common fix exists, a help line.
pub struct ErrorAdapter<'a>(pub &'a TrellisError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TrellisError::NoActiveDiagram { .. } => "trellis::no_active_diagram",
            TrellisError::ScopeMismatch { .. } => "trellis::scope_mismatch",
            TrellisError::DanglingReference { .. } => "trellis::dangling_reference",
            TrellisError::RenderEngineFailure { .. } => "trellis::render_engine_failure",
            TrellisError::ContextBusy { .. } => "trellis::context_busy",
            TrellisError::InvalidLabel { .. } => "trellis::invalid_label",
            TrellisError::Io(_) => "trellis::io",
            TrellisError::Config(_) => "trellis::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            TrellisError::RenderEngineFailure { .. } => {
                "check that Graphviz is installed, or set `program` under [engine] in the configuration"
            }
            TrellisError::InvalidLabel { .. } => "give every node and cluster a non-empty label",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A manifest issue, possibly with source location.
    Issue(IssueAdapter<'a>),
    /// A library error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Issue(i) => fmt::Display::fmt(i, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Issue(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Issue(i) => i.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Issue(i) => i.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Issue(i) => i.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Issue(i) => i.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`CliError`] into reportable diagnostics.
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    match err {
        CliError::Manifest { error, src } => manifest_reportables(error, src),
        CliError::Trellis(err) => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

fn manifest_reportables<'a>(error: &'a ManifestError, src: &'a str) -> Vec<Reportable<'a>> {
    error
        .issues()
        .iter()
        .map(|issue| Reportable::Issue(IssueAdapter::new(issue, src)))
        .collect()
}
