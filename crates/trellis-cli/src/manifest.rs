//! Diagram manifests.
//!
//! A manifest describes one diagram in TOML: a `[diagram]` configuration
//! section, top-level `[[nodes]]` and `[[clusters]]` (clusters nest their own
//! `nodes` and `clusters`), and `[[edges]]` referring to nodes by key.
//!
//! ```toml
//! [diagram]
//! title = "Event Processing"
//!
//! [[nodes]]
//! key = "source"
//! label = "k8s source"
//!
//! [[clusters]]
//! label = "Event Workers"
//! nodes = [
//!     { key = "worker1", label = "worker1" },
//!     { key = "worker2", label = "worker2" },
//! ]
//!
//! [[edges]]
//! from = "source"
//! to = ["worker1", "worker2"]
//! ```
//!
//! Inside a container, nodes are declared before nested clusters. Edges are
//! declared after every node, in manifest order.

use std::{collections::HashMap, ops::Range};

use log::debug;
use serde::Deserialize;
use thiserror::Error;
use toml::Spanned;

use trellis::{
    Cluster, Diagram, DiagramOutput, Node, TrellisError,
    attributes::Attributes,
    color::Color,
    config::{DiagramConfig, DiagramOverrides},
    connect,
    render::RenderEngine,
    structure::{ClusterSpec, EdgeStyle, NodeSpec},
    style::{Direction, LayoutDirection, LineStyle},
};

/// A single problem found in a manifest.
#[derive(Debug, Error)]
pub enum ManifestIssue {
    #[error("invalid manifest: {message}")]
    Syntax {
        message: String,
        span: Option<Range<usize>>,
    },

    /// `span` points at the last declaration of the key.
    #[error("node key `{key}` is declared more than once")]
    DuplicateKey { key: String, span: Range<usize> },

    /// `span` points at the edge's `from` or `to` value holding the key.
    #[error("edge #{index} refers to unknown node `{key}`")]
    UnknownNode {
        index: usize,
        key: String,
        span: Range<usize>,
    },
}

impl ManifestIssue {
    /// Byte range in the manifest source the issue points at, if known.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::Syntax { span, .. } => span.clone(),
            Self::DuplicateKey { span, .. } | Self::UnknownNode { span, .. } => Some(span.clone()),
        }
    }

    /// Short text attached to the span in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "here",
            Self::DuplicateKey { .. } => "declared again here",
            Self::UnknownNode { .. } => "not declared by any node",
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::Syntax { .. } => None,
            Self::DuplicateKey { .. } => Some("node keys must be unique across the whole manifest"),
            Self::UnknownNode { .. } => {
                Some("edges may only refer to keys declared under [[nodes]] or a cluster's nodes")
            }
        }
    }
}

/// Every problem found while loading a manifest.
#[derive(Debug, Error)]
#[error("manifest has {} problem(s)", .issues.len())]
pub struct ManifestError {
    issues: Vec<ManifestIssue>,
}

impl ManifestError {
    pub fn issues(&self) -> &[ManifestIssue] {
        &self.issues
    }
}

/// One or several node keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Keys {
    One(String),
    Many(Vec<String>),
}

impl Keys {
    fn as_slice(&self) -> &[String] {
        match self {
            Keys::One(key) => std::slice::from_ref(key),
            Keys::Many(keys) => keys,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeEntry {
    key: Spanned<String>,
    label: String,
    kind: Option<String>,
    #[serde(default)]
    attrs: Attributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterEntry {
    label: String,
    direction: Option<LayoutDirection>,
    #[serde(default)]
    attrs: Attributes,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    clusters: Vec<ClusterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeEntry {
    from: Spanned<Keys>,
    to: Spanned<Keys>,
    #[serde(default)]
    direction: Direction,
    label: Option<String>,
    color: Option<Color>,
    style: Option<LineStyle>,
    #[serde(default)]
    attrs: Attributes,
}

impl EdgeEntry {
    fn style(&self) -> EdgeStyle {
        let mut style = EdgeStyle::new();
        if let Some(label) = &self.label {
            style = style.with_label(label.as_str());
        }
        if let Some(color) = self.color {
            style = style.with_color(color);
        }
        if let Some(line) = self.style {
            style = style.with_line(line);
        }
        for (name, value) in self.attrs.iter() {
            style = style.with_attr(name, value);
        }
        style
    }
}

/// A parsed and validated diagram manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    diagram: DiagramOverrides,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    clusters: Vec<ClusterEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
}

impl Manifest {
    /// Parses and validates a manifest.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] listing the TOML error, or every duplicate
    /// node key and unknown edge reference.
    pub fn parse(source: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(source).map_err(|err| ManifestError {
            issues: vec![ManifestIssue::Syntax {
                message: err.message().to_string(),
                span: err.span(),
            }],
        })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// The `[diagram]` section exactly as declared.
    pub fn diagram(&self) -> &DiagramOverrides {
        &self.diagram
    }

    /// The `[diagram]` section over the built-in defaults.
    pub fn config(&self) -> DiagramConfig {
        DiagramConfig::default().layered(&self.diagram)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let mut issues = Vec::new();
        let mut keys: HashMap<&str, Vec<Range<usize>>> = HashMap::new();

        let mut pending: Vec<&[NodeEntry]> = vec![self.nodes.as_slice()];
        let mut clusters: Vec<&ClusterEntry> = self.clusters.iter().collect();
        while let Some(cluster) = clusters.pop() {
            pending.push(&cluster.nodes);
            clusters.extend(cluster.clusters.iter());
        }
        for node in pending.into_iter().flatten() {
            keys.entry(node.key.get_ref().as_str())
                .or_default()
                .push(node.key.span());
        }

        let mut duplicates: Vec<(&str, Range<usize>)> = keys
            .iter()
            .filter(|(_, spans)| spans.len() > 1)
            .filter_map(|(key, spans)| {
                spans
                    .iter()
                    .max_by_key(|span| span.start)
                    .map(|span| (*key, span.clone()))
            })
            .collect();
        duplicates.sort_unstable_by(|a, b| a.0.cmp(b.0));
        issues.extend(
            duplicates
                .into_iter()
                .map(|(key, span)| ManifestIssue::DuplicateKey {
                    key: key.to_string(),
                    span,
                }),
        );

        for (index, edge) in self.edges.iter().enumerate() {
            for side in [&edge.from, &edge.to] {
                for key in side.get_ref().as_slice() {
                    if !keys.contains_key(key.as_str()) {
                        issues.push(ManifestIssue::UnknownNode {
                            index,
                            key: key.clone(),
                            span: side.span(),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ManifestError { issues })
        }
    }

    /// Declares the manifest's topology inside a new diagram scope and closes
    /// it, rendering with `engine` when `config` asks for it.
    ///
    /// `config` replaces the manifest's own `[diagram]` section, so callers
    /// can layer defaults and command-line overrides over it first.
    ///
    /// # Errors
    ///
    /// Returns any [`TrellisError`] raised while declaring or rendering.
    pub fn build(
        &self,
        config: DiagramConfig,
        engine: impl RenderEngine + 'static,
    ) -> Result<DiagramOutput, TrellisError> {
        let scope = Diagram::enter(config).with_engine(engine);
        let mut nodes = HashMap::new();

        declare_nodes(&self.nodes, &mut nodes)?;
        for cluster in &self.clusters {
            declare_cluster(cluster, &mut nodes)?;
        }

        for edge in &self.edges {
            let from = resolve(&nodes, edge.from.get_ref())?;
            let to = resolve(&nodes, edge.to.get_ref())?;
            connect(&from, &to, edge.direction, &edge.style())?;
        }
        debug!(nodes = nodes.len(), edges = self.edges.len(); "Manifest declared");

        scope.exit()
    }
}

fn declare_nodes(entries: &[NodeEntry], nodes: &mut HashMap<String, Node>) -> Result<(), TrellisError> {
    for entry in entries {
        let mut spec = NodeSpec::new(entry.label.as_str());
        if let Some(kind) = &entry.kind {
            spec = spec.with_kind(kind.as_str());
        }
        for (name, value) in entry.attrs.iter() {
            spec = spec.with_attr(name, value);
        }
        nodes.insert(entry.key.get_ref().clone(), Node::declare(spec)?);
    }
    Ok(())
}

fn declare_cluster(
    entry: &ClusterEntry,
    nodes: &mut HashMap<String, Node>,
) -> Result<(), TrellisError> {
    let mut spec = ClusterSpec::new(entry.label.as_str());
    if let Some(direction) = entry.direction {
        spec = spec.with_direction(direction);
    }
    for (name, value) in entry.attrs.iter() {
        spec = spec.with_attr(name, value);
    }

    let scope = Cluster::enter_with(spec)?;
    declare_nodes(&entry.nodes, nodes)?;
    for child in &entry.clusters {
        declare_cluster(child, nodes)?;
    }
    scope.exit()?;
    Ok(())
}

fn resolve(nodes: &HashMap<String, Node>, keys: &Keys) -> Result<Vec<Node>, TrellisError> {
    keys.as_slice()
        .iter()
        .map(|key| {
            nodes
                .get(key)
                .copied()
                .ok_or_else(|| TrellisError::Config(format!("unknown node key `{key}`")))
        })
        .collect()
}
