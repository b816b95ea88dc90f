//! Trellis - declarative architecture diagrams rendered through Graphviz.
//!
//! A diagram is described by opening scopes and declaring elements inside
//! them. Nodes and clusters attach to the innermost open scope; edges are
//! declared between node sets through the [`Endpoint`] trait. When the
//! diagram scope closes, the topology is emitted as Graphviz DOT and
//! rendered into one artifact per configured format.
//!
//! # Examples
//!
//! ```
//! use trellis::{Cluster, Diagram, Endpoint, Node, TrellisError, config::DiagramConfig};
//!
//! let config = DiagramConfig::new("Document Translation").with_render(false);
//! let output = Diagram::scope(config, || {
//!     let user = Node::new("User")?;
//!
//!     let mut store = None;
//!     Cluster::scope("Storage", || {
//!         store = Some(Node::of_kind("aws.storage.S3", "Documents")?);
//!         Ok::<_, TrellisError>(())
//!     })?;
//!     let translate = Node::of_kind("aws.ml.Translate", "Translate")?;
//!
//!     if let Some(store) = store {
//!         user.forward(&store)?.forward(&translate)?;
//!     }
//!     Ok::<_, TrellisError>(())
//! })?;
//!
//! let dot = trellis::export::dot::emit(output.diagram())?;
//! assert!(dot.contains(r#"subgraph "cluster_0""#));
//! assert!(dot.contains(r#""node_0" -> "node_1""#));
//! # Ok::<_, TrellisError>(())
//! ```

pub mod config;
pub mod context;
pub mod export;
pub mod icons;
pub mod render;
pub mod structure;

mod endpoint;
mod error;

pub use trellis_core::{attributes, color, identifier, style};

pub use context::{ClusterScope, DiagramOutput, DiagramScope};
pub use endpoint::{Endpoint, Link, connect, declare_edge};
pub use error::{ScopeKind, TrellisError};
pub use structure::{Cluster, Diagram, Edge, EdgeStyle, Node};
