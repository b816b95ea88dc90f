//! Topology model.
//!
//! A [`Diagram`] is an arena owning every node and cluster declared while its
//! scope was open. Elements are keyed by [`Id`]; callers hold lightweight
//! `Copy` handles ([`Node`], [`Cluster`]) instead of references, so the model
//! can be emitted, inspected and tested without object identity.
//!
//! ```text
//! Diagram
//! ├── children: [Child]          top-level, insertion order
//! ├── nodes:    Id -> NodeData   every node, any depth
//! ├── clusters: Id -> ClusterData (each with its own ordered children)
//! └── edges:    [Edge]           declaration order
//! ```

mod cluster;
mod diagram;
mod edge;
mod node;

pub use cluster::{Cluster, ClusterData, ClusterSpec};
pub use diagram::Diagram;
pub use edge::{Edge, EdgeStyle};
pub use node::{Node, NodeData, NodeSpec};

use trellis_core::identifier::Id;

/// The container an element is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// Attached directly to the diagram with the given id.
    Diagram(Id),
    /// Attached to the cluster with the given id.
    Cluster(Id),
}

/// An entry in a container's ordered child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Child {
    Node(Id),
    Cluster(Id),
}
