//! Nodes: single labeled visual elements.

use trellis_core::{attributes::Attributes, identifier::Id};

use super::Parent;
use crate::{context, error::TrellisError};

/// Description of a node to declare.
///
/// # Examples
///
/// ```
/// use trellis::structure::NodeSpec;
///
/// let spec = NodeSpec::new("Orders\n(SQS)")
///     .with_kind("aws.integration.SQS")
///     .with_attr("fontcolor", "#232F3E");
/// assert_eq!(spec.kind(), Some("aws.integration.SQS"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    label: String,
    kind: Option<String>,
    attrs: Attributes,
}

impl NodeSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: None,
            attrs: Attributes::new(),
        }
    }

    /// Sets the visual kind, a dotted path such as `aws.storage.S3`.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets a Graphviz attribute override for this node.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub(crate) fn into_parts(self) -> (String, Option<String>, Attributes) {
        (self.label, self.kind, self.attrs)
    }
}

impl From<&str> for NodeSpec {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for NodeSpec {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

/// A node as stored in the diagram arena.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    id: Id,
    label: String,
    kind: Option<String>,
    parent: Parent,
    attrs: Attributes,
}

impl NodeData {
    pub(crate) fn new(
        id: Id,
        label: String,
        kind: Option<String>,
        parent: Parent,
        attrs: Attributes,
    ) -> Self {
        Self {
            id,
            label,
            kind,
            parent,
            attrs,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Display label, after autolabel prefixing.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// Attribute overrides given at declaration.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }
}

/// Handle to a node declared in a diagram.
///
/// Handles are `Copy` and weak: they identify the node by diagram and node
/// identifier and never own it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    diagram: Id,
    id: Id,
}

impl Node {
    pub(crate) fn from_parts(diagram: Id, id: Id) -> Self {
        Self { diagram, id }
    }

    /// Declares a node with `label` in the current parent scope.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::NoActiveDiagram`] outside a diagram scope and
    /// [`TrellisError::InvalidLabel`] for an empty label.
    pub fn new(label: impl Into<String>) -> Result<Self, TrellisError> {
        Self::declare(NodeSpec::new(label))
    }

    /// Declares a node of the given visual kind.
    pub fn of_kind(kind: impl Into<String>, label: impl Into<String>) -> Result<Self, TrellisError> {
        Self::declare(NodeSpec::new(label).with_kind(kind))
    }

    /// Declares a node from a full [`NodeSpec`].
    pub fn declare(spec: impl Into<NodeSpec>) -> Result<Self, TrellisError> {
        context::register_node(spec.into())
    }

    /// Identifier of the node within its diagram.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Identifier of the diagram the node belongs to.
    pub fn diagram(&self) -> Id {
        self.diagram
    }
}
