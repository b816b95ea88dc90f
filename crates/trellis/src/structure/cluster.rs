//! Clusters: nestable groupings rendered as subgraph boundaries.

use trellis_core::{attributes::Attributes, identifier::Id, style::LayoutDirection};

use super::{Child, Parent};
use crate::{
    context::{self, ClusterScope},
    error::TrellisError,
};

/// Background colors cycled by cluster depth.
const DEPTH_BACKGROUNDS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];

/// Description of a cluster to open.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSpec {
    label: String,
    direction: LayoutDirection,
    attrs: Attributes,
}

impl ClusterSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            direction: LayoutDirection::LeftRight,
            attrs: Attributes::new(),
        }
    }

    /// Sets the rank direction inside the cluster.
    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Sets a Graphviz attribute override for the subgraph.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn into_parts(self) -> (String, LayoutDirection, Attributes) {
        (self.label, self.direction, self.attrs)
    }
}

impl From<&str> for ClusterSpec {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ClusterSpec {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

/// A cluster as stored in the diagram arena.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterData {
    id: Id,
    label: String,
    direction: LayoutDirection,
    depth: usize,
    parent: Parent,
    attrs: Attributes,
    children: Vec<Child>,
}

impl ClusterData {
    pub(crate) fn new(
        id: Id,
        spec: ClusterSpec,
        depth: usize,
        parent: Parent,
    ) -> Self {
        let (label, direction, attrs) = spec.into_parts();
        Self {
            id,
            label,
            direction,
            depth,
            parent,
            attrs,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Nesting depth; 0 for a cluster attached directly to the diagram.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Returns the depth-cycled background color.
    pub fn background(&self) -> &'static str {
        DEPTH_BACKGROUNDS[self.depth % DEPTH_BACKGROUNDS.len()]
    }
}

/// Handle to a cluster declared in a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cluster {
    diagram: Id,
    id: Id,
}

impl Cluster {
    pub(crate) fn from_parts(diagram: Id, id: Id) -> Self {
        Self { diagram, id }
    }

    /// Opens a cluster labeled `label` under the current parent.
    ///
    /// The cluster stays the current parent until the returned scope is
    /// exited or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NoActiveDiagram`] outside a diagram scope and
    /// [`TrellisError::InvalidLabel`] for an empty label.
    pub fn enter(label: impl Into<String>) -> Result<ClusterScope, TrellisError> {
        context::enter_cluster(ClusterSpec::new(label))
    }

    /// Opens a cluster from a full [`ClusterSpec`].
    pub fn enter_with(spec: ClusterSpec) -> Result<ClusterScope, TrellisError> {
        context::enter_cluster(spec)
    }

    /// Runs `body` with a cluster open, closing it on every path.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis::{Cluster, Diagram, Node, TrellisError, config::DiagramConfig};
    ///
    /// let output = Diagram::scope(DiagramConfig::new("Shop").with_render(false), || {
    ///     Cluster::scope("Storage", || {
    ///         Node::new("Orders")?;
    ///         Ok::<_, TrellisError>(())
    ///     })?;
    ///     Ok::<_, TrellisError>(())
    /// })?;
    ///
    /// assert_eq!(output.diagram().clusters().count(), 1);
    /// # Ok::<_, TrellisError>(())
    /// ```
    pub fn scope<F, E>(spec: impl Into<ClusterSpec>, body: F) -> Result<Cluster, E>
    where
        F: FnOnce() -> Result<(), E>,
        E: From<TrellisError>,
    {
        let scope = context::enter_cluster(spec.into())?;
        body()?;
        Ok(scope.exit()?)
    }

    /// Identifier of the cluster within its diagram.
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn diagram(&self) -> Id {
        self.diagram
    }
}
