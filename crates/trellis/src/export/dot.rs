//! Graphviz DOT emission.
//!
//! The emitter walks a finished [`Diagram`] and writes one DOT `digraph`:
//!
//! 1. the header, `strict` when the diagram asks for it;
//! 2. the `graph`, `node` and `edge` default statements;
//! 3. the containment tree, depth first in insertion order, each cluster as a
//!    `subgraph "cluster_<n>"` and each node as a `"node_<n>"` statement;
//! 4. every edge in declaration order.
//!
//! Every value is double-quoted, so labels may contain spaces, quotes and
//! line breaks. The output depends only on the construction sequence, which
//! makes it suitable for snapshot comparisons.

use std::collections::HashSet;

use log::debug;

use trellis_core::{
    attributes::{Attributes, quote},
    identifier::Id,
};

use crate::{
    error::TrellisError,
    icons::{DirectoryIcons, IconResolver, NoIcons},
    structure::{Child, Diagram},
};

/// Emits the DOT description of `diagram`.
///
/// Icons are looked up in the diagram's configured icon directory, if any.
///
/// # Errors
///
/// Returns [`TrellisError::DanglingReference`] if an edge refers to a node
/// that is not part of the diagram's containment tree.
pub fn emit(diagram: &Diagram) -> Result<String, TrellisError> {
    match diagram.config().icon_dir() {
        Some(dir) => emit_with_icons(diagram, &DirectoryIcons::new(dir)),
        None => emit_with_icons(diagram, &NoIcons),
    }
}

/// Emits the DOT description of `diagram`, resolving icons through `icons`.
pub fn emit_with_icons(
    diagram: &Diagram,
    icons: &dyn IconResolver,
) -> Result<String, TrellisError> {
    let mut emitter = Emitter {
        diagram,
        icons,
        out: String::new(),
        depth: 0,
        registered: HashSet::new(),
    };
    emitter.write_diagram()?;

    debug!(
        diagram:% = diagram.id(),
        bytes = emitter.out.len();
        "Emitted DOT description"
    );
    Ok(emitter.out)
}

struct Emitter<'a> {
    diagram: &'a Diagram,
    icons: &'a dyn IconResolver,
    out: String,
    depth: usize,
    /// Nodes written so far; edges may only refer to these.
    registered: HashSet<Id>,
}

impl Emitter<'_> {
    fn write_diagram(&mut self) -> Result<(), TrellisError> {
        let diagram = self.diagram;
        let config = diagram.config();
        let keyword = if config.strict() {
            "strict digraph"
        } else {
            "digraph"
        };
        self.line(&format!("{keyword} {} {{", quote(config.title())));
        self.depth += 1;

        self.statement("graph", &config.graph_attributes());
        self.statement("node", &config.node_attributes());
        self.statement("edge", &config.edge_attributes());

        for child in diagram.children() {
            self.write_child(*child);
        }

        self.write_edges()?;

        self.depth -= 1;
        self.line("}");
        Ok(())
    }

    fn write_child(&mut self, child: Child) {
        match child {
            Child::Node(id) => self.write_node(id),
            Child::Cluster(id) => self.write_cluster(id),
        }
    }

    fn write_node(&mut self, id: Id) {
        let diagram = self.diagram;
        let Some(node) = diagram.node(id) else {
            return;
        };
        let icon = node.kind().and_then(|kind| self.icons.resolve(kind));
        let attrs = diagram.node_attributes(node, icon.as_deref());

        self.statement(&quote(&id.to_string()), &attrs);
        self.registered.insert(id);
    }

    fn write_cluster(&mut self, id: Id) {
        let diagram = self.diagram;
        let Some(cluster) = diagram.cluster(id) else {
            return;
        };

        self.line(&format!("subgraph {} {{", quote(&id.to_string())));
        self.depth += 1;
        self.statement("graph", &diagram.cluster_attributes(cluster));
        for child in cluster.children() {
            self.write_child(*child);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn write_edges(&mut self) -> Result<(), TrellisError> {
        let diagram = self.diagram;
        for edge in diagram.edges() {
            for node in [edge.source(), edge.target()] {
                if !self.registered.contains(&node.id()) {
                    return Err(TrellisError::DanglingReference {
                        operation: "emit",
                        node: node.id(),
                        diagram: diagram.id(),
                    });
                }
            }

            let head = format!(
                "{} -> {}",
                quote(&edge.source().id().to_string()),
                quote(&edge.target().id().to_string())
            );
            self.statement(&head, &edge.attributes());
        }
        Ok(())
    }

    fn statement(&mut self, head: &str, attrs: &Attributes) {
        if attrs.is_empty() {
            self.line(head);
        } else {
            self.line(&format!("{head} {}", attrs.to_dot_list()));
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}
