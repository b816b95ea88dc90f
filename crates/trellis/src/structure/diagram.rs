//! The diagram arena.

use std::path::Path;

use indexmap::IndexMap;
use log::trace;

use trellis_core::{attributes::Attributes, identifier::Id};

use super::{Child, ClusterData, ClusterSpec, Edge, NodeData, NodeSpec, Parent};
use crate::{
    config::DiagramConfig,
    context::{self, DiagramOutput, DiagramScope},
    error::TrellisError,
    render::RenderEngine,
};

const ICON_NODE_HEIGHT: f64 = 1.9;
const ICON_LINE_PADDING: f64 = 0.4;

/// Root container of one topology.
///
/// Owns every node and cluster declared while the diagram was current, the
/// ordered list of top-level children and the ordered edge list. Identifiers
/// are drawn from per-diagram counters (`node_<n>`, `cluster_<n>`), so the
/// same construction sequence always yields the same identifiers.
#[derive(Debug, Clone)]
pub struct Diagram {
    id: Id,
    config: DiagramConfig,
    nodes: IndexMap<Id, NodeData>,
    clusters: IndexMap<Id, ClusterData>,
    children: Vec<Child>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Opens a diagram scope; see [`context::enter_diagram`].
    pub fn enter(config: DiagramConfig) -> DiagramScope {
        context::enter_diagram(config)
    }

    /// Runs `body` with a diagram open, then closes (and renders) it.
    ///
    /// The diagram is discarded without rendering if `body` fails, and the
    /// context stack is restored on every path.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis::{Diagram, Endpoint, Node, TrellisError, config::DiagramConfig};
    ///
    /// let output = Diagram::scope(DiagramConfig::new("Web").with_render(false), || {
    ///     let lb = Node::of_kind("onprem.network.Nginx", "LB")?;
    ///     let web = Node::new("Web")?;
    ///     lb.forward(&web)?;
    ///     Ok::<_, TrellisError>(())
    /// })?;
    ///
    /// assert_eq!(output.diagram().edges().len(), 1);
    /// # Ok::<_, TrellisError>(())
    /// ```
    pub fn scope<F, E>(config: DiagramConfig, body: F) -> Result<DiagramOutput, E>
    where
        F: FnOnce() -> Result<(), E>,
        E: From<TrellisError>,
    {
        let scope = context::enter_diagram(config);
        body()?;
        Ok(scope.exit()?)
    }

    /// Like [`Diagram::scope`], rendering through `engine`.
    pub fn scope_with<F, E>(
        config: DiagramConfig,
        engine: impl RenderEngine + 'static,
        body: F,
    ) -> Result<DiagramOutput, E>
    where
        F: FnOnce() -> Result<(), E>,
        E: From<TrellisError>,
    {
        let scope = context::enter_diagram(config).with_engine(engine);
        body()?;
        Ok(scope.exit()?)
    }

    pub(crate) fn new(id: Id, config: DiagramConfig) -> Self {
        Self {
            id,
            config,
            nodes: IndexMap::new(),
            clusters: IndexMap::new(),
            children: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Identifier of the diagram, unique within the process.
    pub fn id(&self) -> Id {
        self.id
    }

    /// The configuration the diagram was opened with.
    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    /// Top-level children in insertion order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }


    pub fn node(&self, id: Id) -> Option<&NodeData> {
        self.nodes.get(&id)
    }

    /// Every node in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.values()
    }

    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn cluster(&self, id: Id) -> Option<&ClusterData> {
        self.clusters.get(&id)
    }

    /// Every cluster in declaration order.
    pub fn clusters(&self) -> impl Iterator<Item = &ClusterData> {
        self.clusters.values()
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Adds a node under `parent` and returns its identifier.
    ///
    /// When autolabel is enabled and the node has a kind, the label is
    /// prefixed with the last segment of the kind.
    pub(crate) fn add_node(&mut self, parent: Parent, spec: NodeSpec) -> Id {
        let id = Id::sequenced("node", self.nodes.len());
        let (label, kind, attrs) = spec.into_parts();

        let label = match (&kind, self.config.autolabel()) {
            (Some(kind), true) => {
                let prefix = kind.rsplit('.').next().unwrap_or(kind);
                format!("{prefix}\n{label}")
            }
            _ => label,
        };

        trace!(node:% = id, label:?, parent:?; "Adding node");
        self.nodes
            .insert(id, NodeData::new(id, label, kind, parent, attrs));
        self.attach(parent, Child::Node(id));
        id
    }

    /// Adds a cluster under `parent` and returns its identifier.
    pub(crate) fn add_cluster(&mut self, parent: Parent, spec: ClusterSpec) -> Id {
        let id = Id::sequenced("cluster", self.clusters.len());
        let depth = match parent {
            Parent::Cluster(parent_id) => self
                .clusters
                .get(&parent_id)
                .map_or(0, |cluster| cluster.depth() + 1),
            Parent::Diagram(_) => 0,
        };

        trace!(cluster:% = id, depth, parent:?; "Adding cluster");
        self.clusters
            .insert(id, ClusterData::new(id, spec, depth, parent));
        self.attach(parent, Child::Cluster(id));
        id
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    fn attach(&mut self, parent: Parent, child: Child) {
        match parent {
            Parent::Cluster(parent_id) => {
                if let Some(cluster) = self.clusters.get_mut(&parent_id) {
                    cluster.push_child(child);
                    return;
                }
                // An unknown parent cluster cannot come out of the context
                // stack; fall back to the root so the child is still emitted.
                self.children.push(child);
            }
            Parent::Diagram(_) => self.children.push(child),
        }
    }

    /// Effective attributes of a node.
    ///
    /// The label comes first, then the icon settings when the node's kind
    /// resolved to an image, then the node's own overrides. Icon nodes grow
    /// 0.4 inches per extra label line so the text stays below the image.
    pub fn node_attributes(&self, node: &NodeData, icon: Option<&Path>) -> Attributes {
        let mut attrs = Attributes::new().with("label", node.label());
        if let Some(icon) = icon {
            let extra_lines = node.label().matches('\n').count();
            let height = ICON_NODE_HEIGHT + ICON_LINE_PADDING * extra_lines as f64;
            attrs.set("shape", "none");
            attrs.set("height", format!("{height:.1}"));
            attrs.set("image", icon.display().to_string());
        }
        attrs.overlay(node.attrs());
        attrs
    }

    /// Effective attributes of a cluster subgraph.
    pub fn cluster_attributes(&self, cluster: &ClusterData) -> Attributes {
        let mut attrs: Attributes = [
            ("shape", "box"),
            ("style", "rounded"),
            ("labeljust", "l"),
            ("pencolor", "#AEB6BE"),
            ("fontname", "Sans-Serif"),
            ("fontsize", "12"),
        ]
        .into_iter()
        .collect();
        attrs.set("label", cluster.label());
        attrs.set("rankdir", cluster.direction().to_dot_value());
        attrs.set("bgcolor", cluster.background());
        attrs.overlay(cluster.attrs());
        attrs
    }
}
