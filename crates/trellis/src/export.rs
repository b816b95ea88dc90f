//! Export of finished diagrams.
//!
//! A closed [`Diagram`](crate::Diagram) is described to Graphviz as DOT text
//! by the [`dot`] emitter. The description is then either written out as is
//! (the `dot` format) or handed to a [`RenderEngine`](crate::render::RenderEngine)
//! which lays it out and produces the image artifacts.
//!
//! # Pipeline Position
//!
//! ```text
//! Declarations (nodes, clusters, edges)
//!     ↓ scope exit
//! Diagram
//!     ↓ export::dot (this module)
//! DOT description
//!     ↓ render
//! Artifact files
//! ```

/// Graphviz DOT emitter.
pub mod dot;
