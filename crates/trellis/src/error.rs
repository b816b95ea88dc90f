//! Error types for Trellis operations.
//!
//! This module provides the main error type [`TrellisError`]. Structural
//! misuse (declaring topology outside a diagram, closing scopes out of order)
//! is reported at the call site; dangling edge endpoints and render engine
//! failures surface while emitting or rendering.

use std::{fmt, io};

use thiserror::Error;

use trellis_core::{identifier::Id, style::OutputFormat};

/// The kind of scope a [`TrellisError::ScopeMismatch`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Diagram,
    Cluster,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagram => f.write_str("diagram"),
            Self::Cluster => f.write_str("cluster"),
        }
    }
}

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("no active diagram: `{operation}` requires an open diagram scope")]
    NoActiveDiagram { operation: &'static str },

    #[error(
        "scope mismatch: cannot close {scope} `{closing}` while {} is innermost",
        describe_innermost(.scope, .innermost)
    )]
    ScopeMismatch {
        scope: ScopeKind,
        closing: Id,
        innermost: Option<Id>,
    },

    #[error("dangling reference: `{operation}` refers to node `{node}` which is not registered in diagram `{diagram}`")]
    DanglingReference {
        operation: &'static str,
        node: Id,
        diagram: Id,
    },

    #[error("render engine failure while producing {format} for diagram `{diagram}`: {reason}")]
    RenderEngineFailure {
        diagram: Id,
        format: OutputFormat,
        reason: String,
    },

    #[error("context busy: `{operation}` cannot modify the diagram while it is being read")]
    ContextBusy { operation: &'static str },

    #[error("invalid label: {entity} labels must not be empty")]
    InvalidLabel { entity: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe_innermost(scope: &ScopeKind, innermost: &Option<Id>) -> String {
    match innermost {
        Some(id) => format!("{scope} `{id}`"),
        None => format!("no {scope}"),
    }
}

impl TrellisError {
    /// Create a new `RenderEngineFailure` from any displayable cause.
    pub fn render_failure(diagram: Id, format: OutputFormat, reason: impl fmt::Display) -> Self {
        Self::RenderEngineFailure {
            diagram,
            format,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_mismatch_message_names_both_scopes() {
        let err = TrellisError::ScopeMismatch {
            scope: ScopeKind::Cluster,
            closing: Id::new("cluster_0"),
            innermost: Some(Id::new("cluster_1")),
        };
        assert_eq!(
            err.to_string(),
            "scope mismatch: cannot close cluster `cluster_0` while cluster `cluster_1` is innermost"
        );
    }

    #[test]
    fn test_scope_mismatch_without_innermost() {
        let err = TrellisError::ScopeMismatch {
            scope: ScopeKind::Diagram,
            closing: Id::new("diagram_3"),
            innermost: None,
        };
        assert!(err.to_string().ends_with("while no diagram is innermost"));
    }

    #[test]
    fn test_no_active_diagram_names_operation() {
        let err = TrellisError::NoActiveDiagram {
            operation: "Node::new",
        };
        assert!(err.to_string().contains("`Node::new`"));
    }
}
