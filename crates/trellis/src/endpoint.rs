//! Edge declaration.
//!
//! [`connect`] relates every node of a source [`Endpoint`] to every node of a
//! target [`Endpoint`]. Anything that resolves to an ordered set of nodes is
//! an endpoint: a single [`Node`], arrays, slices and vectors of nodes, and
//! the [`Link`] returned by a previous `connect`, which resolves to that
//! call's targets. This makes multi-hop chains read left to right:
//!
//! ```
//! use trellis::{Diagram, Endpoint, Node, TrellisError, config::DiagramConfig};
//!
//! let output = Diagram::scope(DiagramConfig::new("Chain").with_render(false), || {
//!     let client = Node::new("Client")?;
//!     let auth = Node::new("Cognito")?;
//!     let idp = Node::new("Identity Provider")?;
//!     let api = Node::new("API")?;
//!     let db = Node::new("DynamoDB")?;
//!
//!     client.forward(&auth)?.forward(&idp)?;
//!     api.reverse(&db)?.forward(&[auth, idp])?;
//!     Ok::<_, TrellisError>(())
//! })?;
//!
//! assert_eq!(output.diagram().edges().len(), 5);
//! # Ok::<_, TrellisError>(())
//! ```

use trellis_core::style::Direction;

use crate::{
    context,
    error::TrellisError,
    structure::{Edge, EdgeStyle, Node},
};

/// Something that resolves to an ordered set of nodes.
pub trait Endpoint {
    /// The nodes this endpoint stands for, in order.
    fn nodes(&self) -> Vec<Node>;

    /// Connects with arrowheads at the targets.
    fn forward<T>(&self, target: &T) -> Result<Link, TrellisError>
    where
        T: Endpoint + ?Sized,
    {
        connect(self, target, Direction::Forward, &EdgeStyle::default())
    }

    /// Connects with arrowheads at this endpoint's nodes.
    fn reverse<T>(&self, target: &T) -> Result<Link, TrellisError>
    where
        T: Endpoint + ?Sized,
    {
        connect(self, target, Direction::Reverse, &EdgeStyle::default())
    }

    /// Connects with arrowheads at both ends.
    fn both<T>(&self, target: &T) -> Result<Link, TrellisError>
    where
        T: Endpoint + ?Sized,
    {
        connect(self, target, Direction::Both, &EdgeStyle::default())
    }

    /// Connects with plain lines.
    fn undirected<T>(&self, target: &T) -> Result<Link, TrellisError>
    where
        T: Endpoint + ?Sized,
    {
        connect(self, target, Direction::None, &EdgeStyle::default())
    }

    /// Connects with an explicit direction and style.
    fn connect_with<T>(
        &self,
        target: &T,
        direction: Direction,
        style: &EdgeStyle,
    ) -> Result<Link, TrellisError>
    where
        T: Endpoint + ?Sized,
    {
        connect(self, target, direction, style)
    }
}

impl Endpoint for Node {
    fn nodes(&self) -> Vec<Node> {
        vec![*self]
    }
}

impl Endpoint for [Node] {
    fn nodes(&self) -> Vec<Node> {
        self.to_vec()
    }
}

impl<const N: usize> Endpoint for [Node; N] {
    fn nodes(&self) -> Vec<Node> {
        self.to_vec()
    }
}

impl Endpoint for Vec<Node> {
    fn nodes(&self) -> Vec<Node> {
        self.clone()
    }
}

/// The result of a [`connect`] call.
///
/// As an [`Endpoint`] a link resolves to exactly the targets of the call
/// that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    targets: Vec<Node>,
    edges: Vec<Edge>,
}

impl Link {
    /// Target nodes of the call.
    pub fn targets(&self) -> &[Node] {
        &self.targets
    }

    /// Edges declared by the call, in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl Endpoint for Link {
    fn nodes(&self) -> Vec<Node> {
        self.targets.clone()
    }
}

/// Declares one edge per `(source, target)` pair.
///
/// Pairs are produced row-major: every target for the first source, then every
/// target for the second, and so on. All edges are validated before any is
/// appended to the current diagram.
///
/// # Errors
///
/// - [`TrellisError::NoActiveDiagram`] outside a diagram scope.
/// - [`TrellisError::DanglingReference`] if a node belongs to another diagram.
pub fn connect<S, T>(
    source: &S,
    target: &T,
    direction: Direction,
    style: &EdgeStyle,
) -> Result<Link, TrellisError>
where
    S: Endpoint + ?Sized,
    T: Endpoint + ?Sized,
{
    let sources = source.nodes();
    let targets = target.nodes();

    let edges: Vec<Edge> = sources
        .iter()
        .flat_map(|from| {
            targets
                .iter()
                .map(move |to| Edge::new(from, to, direction, style.clone()))
        })
        .collect();

    context::append_edges("connect", &edges)?;

    Ok(Link { targets, edges })
}

/// Appends an already-built edge, such as one derived with
/// [`Edge::with_style`], to the current diagram.
///
/// # Errors
///
/// Same as [`connect`].
pub fn declare_edge(edge: Edge) -> Result<Edge, TrellisError> {
    context::append_edges("declare_edge", std::slice::from_ref(&edge))?;
    Ok(edge)
}

#[cfg(test)]
mod tests {
    use trellis_core::color::Color;

    use super::*;
    use crate::{config::DiagramConfig, context::enter_diagram};

    fn pairs(edges: &[Edge]) -> Vec<(Node, Node)> {
        edges
            .iter()
            .map(|edge| (edge.source(), edge.target()))
            .collect()
    }

    #[test]
    fn test_cross_product_is_row_major() {
        let scope = enter_diagram(DiagramConfig::new("Fan").with_render(false));
        let a = Node::new("A").unwrap();
        let b = Node::new("B").unwrap();
        let c = Node::new("C").unwrap();
        let d = Node::new("D").unwrap();

        let link = connect(&[a, b], &[c, d], Direction::Forward, &EdgeStyle::default()).unwrap();

        assert_eq!(pairs(link.edges()), vec![(a, c), (a, d), (b, c), (b, d)]);
        assert_eq!(link.targets(), &[c, d]);
        scope.exit().unwrap();
    }

    #[test]
    fn test_chain_resolves_to_previous_targets() {
        let scope = enter_diagram(DiagramConfig::new("Chain").with_render(false));
        let a = Node::new("A").unwrap();
        let b = Node::new("B").unwrap();
        let c = Node::new("C").unwrap();

        let second = a.forward(&b).unwrap().reverse(&c).unwrap();

        assert_eq!(pairs(second.edges()), vec![(b, c)]);
        assert_eq!(second.edges()[0].direction(), Direction::Reverse);

        let output = scope.exit().unwrap();
        assert_eq!(pairs(output.diagram().edges()), vec![(a, b), (b, c)]);
    }

    #[test]
    fn test_empty_collection_declares_nothing() {
        let scope = enter_diagram(DiagramConfig::new("Empty").with_render(false));
        let a = Node::new("A").unwrap();
        let none: Vec<Node> = Vec::new();

        let link = a.forward(&none).unwrap();

        assert!(link.edges().is_empty());
        assert!(link.nodes().is_empty());
        scope.exit().unwrap();
    }

    #[test]
    fn test_connect_without_diagram() {
        let outer = enter_diagram(DiagramConfig::new("Gone").with_render(false));
        let a = Node::new("A").unwrap();
        outer.exit().unwrap();

        assert!(matches!(
            a.forward(&a),
            Err(TrellisError::NoActiveDiagram { operation: "connect" })
        ));
    }

    #[test]
    fn test_cross_diagram_edge_is_dangling() {
        let outer = enter_diagram(DiagramConfig::new("Outer").with_render(false));
        let foreign = Node::new("Foreign").unwrap();

        let inner = enter_diagram(DiagramConfig::new("Inner").with_render(false));
        let local = Node::new("Local").unwrap();

        let err = local.forward(&foreign).unwrap_err();
        assert!(matches!(
            err,
            TrellisError::DanglingReference { node, .. } if node == foreign.id()
        ));

        let output = inner.exit().unwrap();
        assert!(output.diagram().edges().is_empty());
        outer.exit().unwrap();
    }

    #[test]
    fn test_node_from_another_thread_is_dangling() {
        let foreign = std::thread::spawn(|| {
            let scope = enter_diagram(DiagramConfig::new("Elsewhere").with_render(false));
            let node = Node::new("Foreign").unwrap();
            scope.exit().unwrap();
            node
        })
        .join()
        .unwrap();

        let scope = enter_diagram(DiagramConfig::new("Here").with_render(false));
        let local = Node::new("Local").unwrap();
        assert_eq!(local.id(), foreign.id());
        assert_ne!(local.diagram(), foreign.diagram());

        assert!(matches!(
            local.forward(&foreign),
            Err(TrellisError::DanglingReference { node, .. }) if node == foreign.id()
        ));

        let output = scope.exit().unwrap();
        assert!(output.diagram().edges().is_empty());
    }

    #[test]
    fn test_declare_edge_appends_derived_copy() {
        let scope = enter_diagram(DiagramConfig::new("Derived").with_render(false));
        let a = Node::new("A").unwrap();
        let b = Node::new("B").unwrap();

        let original = a.forward(&b).unwrap().edges()[0].clone();
        let red = Color::new("red").unwrap();
        let derived = declare_edge(
            original
                .with_direction(Direction::Both)
                .with_style(&EdgeStyle::new().with_color(red)),
        )
        .unwrap();

        let output = scope.exit().unwrap();
        let edges = output.diagram().edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], original);
        assert_eq!(edges[1], derived);
        assert_eq!(edges[0].style().color(), None);
    }
}
