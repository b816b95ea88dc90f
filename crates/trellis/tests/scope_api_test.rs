//! Integration tests for the scope API
//!
//! These tests drive the public API the way a diagram script would: open a
//! diagram, declare elements inside nested scopes, close it and inspect the
//! resulting description and artifacts.

use std::{cell::RefCell, fs, path::Path, rc::Rc};

use trellis::{
    Cluster, Diagram, Endpoint, Node, TrellisError,
    config::DiagramConfig,
    connect, context, declare_edge,
    render::{RenderEngine, RenderError},
    structure::{ClusterSpec, EdgeStyle, NodeSpec},
    style::{Direction, LayoutDirection, OutputFormat},
};

/// Engine that writes the description it receives and keeps a copy.
#[derive(Clone, Default)]
struct Capture {
    seen: Rc<RefCell<Vec<(OutputFormat, String)>>>,
}

impl RenderEngine for Capture {
    fn name(&self) -> &str {
        "capture"
    }

    fn render(
        &self,
        description: &str,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), RenderError> {
        self.seen
            .borrow_mut()
            .push((format, description.to_string()));
        fs::write(output, description)?;
        Ok(())
    }
}

/// Engine that always fails.
struct Unavailable;

impl RenderEngine for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn render(&self, _: &str, _: OutputFormat, _: &Path) -> Result<(), RenderError> {
        Err(RenderError::Engine("layout program not installed".to_string()))
    }
}

fn quiet(title: &str) -> DiagramConfig {
    DiagramConfig::new(title).with_render(false)
}

#[test]
fn test_simple_edge() {
    let output = Diagram::scope(quiet("Simple"), || {
        let a = Node::new("A")?;
        let b = Node::new("B")?;
        a.forward(&b)?;
        Ok::<_, TrellisError>(())
    })
    .expect("diagram should close");

    let diagram = output.diagram();
    assert_eq!(diagram.nodes().count(), 2);
    assert_eq!(diagram.edges().len(), 1);
    assert_eq!(diagram.edges()[0].direction(), Direction::Forward);
    assert!(context::is_idle());
}

#[test]
fn test_fan_out_declares_one_edge_per_target() {
    let output = Diagram::scope(quiet("Fan Out"), || {
        let source = Node::new("source")?;
        let workers = vec![
            Node::new("worker1")?,
            Node::new("worker2")?,
            Node::new("worker3")?,
        ];
        let link = source.forward(&workers)?;
        assert_eq!(link.targets(), workers.as_slice());
        Ok::<_, TrellisError>(())
    })
    .expect("diagram should close");

    let edges = output.diagram().edges();
    assert_eq!(edges.len(), 3);
    assert!(edges.iter().all(|edge| edge.source() == edges[0].source()));
}

#[test]
fn test_scope_lifecycle_restores_parents() {
    let scope = Diagram::enter(quiet("Lifecycle"));
    let diagram_id = scope.id();

    let outer = Cluster::enter("outer").unwrap();
    let inner = Cluster::enter_with(
        ClusterSpec::new("inner").with_direction(LayoutDirection::TopBottom),
    )
    .unwrap();
    let node = Node::new("deep").unwrap();
    inner.exit().unwrap();
    let sibling = Node::new("shallow").unwrap();
    outer.exit().unwrap();

    let output = scope.exit().unwrap();
    let diagram = output.diagram();

    assert_eq!(output.diagram().id(), diagram_id);
    assert_eq!(diagram.clusters().count(), 2);
    let deep = diagram.node(node.id()).unwrap();
    let shallow = diagram.node(sibling.id()).unwrap();
    assert_ne!(deep.parent(), shallow.parent());
    assert!(context::is_idle());
}

#[test]
fn test_errors_inside_scope_unwind_the_stack() {
    let result = Diagram::scope(quiet("Unwind"), || {
        Cluster::scope("broken", || {
            Node::new("")?;
            Ok::<_, TrellisError>(())
        })?;
        Ok::<_, TrellisError>(())
    });

    assert!(matches!(
        result,
        Err(TrellisError::InvalidLabel { entity: "node" })
    ));
    assert!(context::is_idle());
}

#[test]
fn test_declare_outside_diagram() {
    assert!(matches!(
        Node::new("orphan"),
        Err(TrellisError::NoActiveDiagram { .. })
    ));
    assert!(matches!(
        Cluster::enter("orphan"),
        Err(TrellisError::NoActiveDiagram { .. })
    ));
}

#[test]
fn test_style_override_is_a_copy() {
    let output = Diagram::scope(quiet("Overrides"), || {
        let a = Node::declare(NodeSpec::new("A").with_attr("fontsize", "10"))?;
        let b = Node::new("B")?;
        let link = connect(
            &a,
            &b,
            Direction::Forward,
            &EdgeStyle::new().with_label("calls"),
        )?;
        let original = link.edges()[0].clone();
        declare_edge(original.with_style(&EdgeStyle::new().with_attr("penwidth", "3")))?;
        Ok::<_, TrellisError>(())
    })
    .expect("diagram should close");

    let edges = output.diagram().edges();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].style().attrs().get("penwidth"), None);
    assert_eq!(edges[1].style().attrs().get("penwidth"), Some("3"));
    assert_eq!(edges[1].style().label(), Some("calls"));
}

#[test]
fn test_render_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Capture::default();
    let config = DiagramConfig::new("Web Service")
        .with_output_dir(dir.path())
        .with_formats([OutputFormat::Png, OutputFormat::Dot]);

    let output = Diagram::scope_with(config, engine.clone(), || {
        let lb = Node::of_kind("onprem.network.Nginx", "lb")?;
        let web = Node::new("web")?;
        lb.both(&web)?;
        Ok::<_, TrellisError>(())
    })
    .expect("render should succeed");

    let description = output.description().expect("description is emitted");
    assert_eq!(
        output.artifacts(),
        &[
            dir.path().join("web_service.png"),
            dir.path().join("web_service.dot"),
        ]
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("web_service.dot")).unwrap(),
        description
    );

    let seen = engine.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, OutputFormat::Png);
    assert_eq!(seen[0].1, description);
    assert!(description.contains(r#""node_0" -> "node_1" [dir="both"]"#));
}

#[test]
fn test_failed_render_reports_and_leaves_context_idle() {
    let dir = tempfile::tempdir().unwrap();
    let config = DiagramConfig::new("Broken").with_output_dir(dir.path());

    let scope = Diagram::enter(config).with_engine(Unavailable);
    Node::new("lonely").unwrap();
    let err = scope.exit().unwrap_err();

    match err {
        TrellisError::RenderEngineFailure { format, reason, .. } => {
            assert_eq!(format, OutputFormat::Png);
            assert!(reason.contains("not installed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.path().join("broken.png").exists());
    assert!(context::is_idle());
}

#[test]
fn test_identical_scripts_emit_identical_descriptions() {
    fn script() -> String {
        let output = Diagram::scope(quiet("Repeat"), || {
            let users = [Node::new("alice")?, Node::new("bob")?];
            Cluster::scope("backend", || {
                let api = Node::new("api")?;
                let db = Node::new("db")?;
                users.forward(&api)?.undirected(&db)?;
                Ok::<_, TrellisError>(())
            })?;
            Ok::<_, TrellisError>(())
        })
        .expect("diagram should close");
        trellis::export::dot::emit(output.diagram()).expect("emission should succeed")
    }

    assert_eq!(script(), script());
}

#[test]
fn test_clusters_are_emitted_before_edges_between_them() {
    let output = Diagram::scope(quiet("Pipeline"), || {
        let ingest = Cluster::enter("Ingest")?;
        let queue = Node::new("Queue")?;
        ingest.exit()?;

        let store = Cluster::enter("Store")?;
        let db = Node::new("DB")?;
        store.exit()?;

        connect(&queue, &db, Direction::Forward, &EdgeStyle::default())?;
        Ok::<_, TrellisError>(())
    })
    .expect("diagram should close");

    let description = trellis::export::dot::emit(output.diagram()).expect("emission should succeed");
    let lines: Vec<&str> = description.lines().map(str::trim_start).collect();
    let position = |needle: &str| {
        lines
            .iter()
            .position(|line| line.starts_with(needle))
            .unwrap_or_else(|| panic!("`{needle}` missing from:\n{description}"))
    };

    let ingest = position("subgraph \"cluster_0\"");
    let store = position("subgraph \"cluster_1\"");
    let edge = position("\"node_0\" -> \"node_1\"");

    assert_eq!(lines.iter().filter(|line| line.starts_with("subgraph")).count(), 2);
    assert!(ingest < store);
    assert!(store < edge);
    assert!(lines[ingest..store].iter().any(|line| line.contains("label=\"Queue\"")));
    assert!(lines[store..edge].iter().any(|line| line.contains("label=\"DB\"")));
}

#[test]
fn test_nodes_sharing_a_label_stay_distinct() {
    let output = Diagram::scope(quiet("Twins"), || {
        let first = Node::new("X")?;
        let second = Node::new("X")?;
        first.forward(&second)?;
        Ok::<_, TrellisError>(())
    })
    .expect("diagram should close");

    let diagram = output.diagram();
    assert_eq!(diagram.nodes().count(), 2);
    let edge = &diagram.edges()[0];
    assert_ne!(edge.source().id(), edge.target().id());

    let description = trellis::export::dot::emit(diagram).expect("emission should succeed");
    assert!(description.contains("\"node_0\" -> \"node_1\""));
}
