//! The context stack: which diagram and cluster are currently open.
//!
//! Nodes and clusters attach themselves to the innermost open scope instead of
//! taking an explicit parent. That state lives here, in a thread-local stack
//! of diagram frames; each frame carries the stack of clusters opened inside
//! it.
//!
//! Scopes are acquired through guards:
//!
//! - [`DiagramScope`] from [`enter_diagram`] (or [`Diagram::enter`])
//! - [`ClusterScope`] from [`enter_cluster`] (or [`Cluster::enter`])
//!
//! Exiting a guard explicitly checks that it is the innermost scope of its
//! kind and reports [`TrellisError::ScopeMismatch`] otherwise. A guard that is
//! dropped without a successful exit (early return, `?`, panic) removes its
//! scope wherever it sits, so the stack never retains a closed scope. The
//! closure forms [`Diagram::scope`] and [`Cluster::scope`] wrap both paths.
//!
//! Guards are `!Send`: a scope opened on one thread cannot be closed on
//! another, and two threads building diagrams never observe each other.
//!
//! [`Diagram::enter`]: crate::Diagram::enter
//! [`Diagram::scope`]: crate::Diagram::scope
//! [`Cluster::enter`]: crate::structure::Cluster::enter
//! [`Cluster::scope`]: crate::structure::Cluster::scope

use std::{
    cell::RefCell,
    marker::PhantomData,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use log::{debug, info, warn};

use trellis_core::identifier::Id;

use crate::{
    config::DiagramConfig,
    error::{ScopeKind, TrellisError},
    export,
    render::{self, DotCommand, RenderEngine},
    structure::{Cluster, ClusterSpec, Diagram, Edge, Node, NodeSpec, Parent},
};

/// One open diagram and the clusters opened inside it, innermost last.
#[derive(Debug)]
struct Frame {
    diagram: Diagram,
    clusters: Vec<Id>,
}

impl Frame {
    fn current_parent(&self) -> Parent {
        self.clusters
            .last()
            .map_or(Parent::Diagram(self.diagram.id()), |id| Parent::Cluster(*id))
    }
}

#[derive(Debug, Default)]
struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    fn top(&self, operation: &'static str) -> Result<&Frame, TrellisError> {
        self.frames
            .last()
            .ok_or(TrellisError::NoActiveDiagram { operation })
    }

    fn top_mut(&mut self, operation: &'static str) -> Result<&mut Frame, TrellisError> {
        self.frames
            .last_mut()
            .ok_or(TrellisError::NoActiveDiagram { operation })
    }

    fn frame_mut(&mut self, diagram: Id) -> Option<&mut Frame> {
        self.frames
            .iter_mut()
            .find(|frame| frame.diagram.id() == diagram)
    }
}

/// Diagrams opened in this process so far; source of diagram identifiers.
///
/// Node handles can cross threads, so diagram identifiers must be unique
/// process-wide for the cross-diagram check to hold.
static DIAGRAMS_OPENED: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CONTEXT: RefCell<ContextStack> = RefCell::new(ContextStack::default());
}

/// Runs `f` with write access to the stack.
///
/// Fails with [`TrellisError::ContextBusy`] while the stack is borrowed, which
/// happens when `f` of [`with_current_diagram`] tries to modify the topology.
fn with_stack<R>(
    operation: &'static str,
    f: impl FnOnce(&mut ContextStack) -> Result<R, TrellisError>,
) -> Result<R, TrellisError> {
    CONTEXT.with(|ctx| {
        let mut stack = ctx
            .try_borrow_mut()
            .map_err(|_| TrellisError::ContextBusy { operation })?;
        f(&mut stack)
    })
}

/// Runs `f` with read access to the stack.
fn read_stack<R>(f: impl FnOnce(&ContextStack) -> R) -> R {
    CONTEXT.with(|ctx| f(&ctx.borrow()))
}

/// Runs `f` on the stack if it is still reachable.
///
/// Used from `Drop`, where the thread-local may already be torn down or the
/// stack may be borrowed by a panicking caller.
fn try_with_stack(f: impl FnOnce(&mut ContextStack)) {
    let _ = CONTEXT.try_with(|ctx| {
        if let Ok(mut stack) = ctx.try_borrow_mut() {
            f(&mut stack);
        }
    });
}

/// Result of closing a diagram scope.
#[derive(Debug)]
pub struct DiagramOutput {
    diagram: Diagram,
    description: Option<String>,
    artifacts: Vec<PathBuf>,
}

impl DiagramOutput {
    /// The finished topology.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// The emitted DOT description, when the diagram was rendered.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Paths of the artifacts written, one per configured format.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }
}

/// Guard for an open diagram.
///
/// While the guard is alive its diagram is current (unless a nested diagram
/// is opened). Call [`DiagramScope::exit`] to close it and trigger rendering.
#[must_use = "dropping the scope discards the diagram without rendering"]
pub struct DiagramScope {
    id: Id,
    engine: Box<dyn RenderEngine>,
    closed: bool,
    _not_send: PhantomData<*const ()>,
}

impl std::fmt::Debug for DiagramScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramScope")
            .field("id", &self.id)
            .field("engine", &self.engine.name())
            .field("closed", &self.closed)
            .finish()
    }
}

impl DiagramScope {
    /// Identifier of the diagram this scope owns.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Replaces the engine used when the scope exits.
    pub fn with_engine(mut self, engine: impl RenderEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Closes the diagram.
    ///
    /// The frame is popped before anything else happens, so a failed render
    /// still leaves the context stack consistent. When the diagram's `render`
    /// setting is on, the topology is emitted and every configured format is
    /// rendered.
    ///
    /// # Errors
    ///
    /// - [`TrellisError::ScopeMismatch`] if a nested diagram is still open.
    /// - [`TrellisError::DanglingReference`] if emission finds an edge to an
    ///   unregistered node.
    /// - [`TrellisError::RenderEngineFailure`] if the engine fails.
    pub fn exit(mut self) -> Result<DiagramOutput, TrellisError> {
        let diagram = with_stack("exit_diagram", |stack| {
            let innermost = stack.frames.last().map(|frame| frame.diagram.id());
            if innermost != Some(self.id) {
                return Err(TrellisError::ScopeMismatch {
                    scope: ScopeKind::Diagram,
                    closing: self.id,
                    innermost,
                });
            }
            let Some(frame) = stack.frames.pop() else {
                return Err(TrellisError::NoActiveDiagram {
                    operation: "exit_diagram",
                });
            };
            if !frame.clusters.is_empty() {
                warn!(
                    diagram:% = self.id,
                    open_clusters = frame.clusters.len();
                    "Closing diagram with clusters still open"
                );
            }
            Ok(frame.diagram)
        })?;
        self.closed = true;
        info!(diagram:% = self.id, title = diagram.config().title(); "Diagram scope closed");

        if !diagram.config().render() {
            debug!(diagram:% = self.id; "Rendering disabled, skipping emission");
            return Ok(DiagramOutput {
                diagram,
                description: None,
                artifacts: Vec::new(),
            });
        }

        let description = export::dot::emit(&diagram)?;
        let artifacts = render::render_all(&diagram, &description, self.engine.as_ref())?;

        Ok(DiagramOutput {
            diagram,
            description: Some(description),
            artifacts,
        })
    }
}

impl Drop for DiagramScope {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let id = self.id;
        try_with_stack(|stack| {
            let before = stack.frames.len();
            stack.frames.retain(|frame| frame.diagram.id() != id);
            if stack.frames.len() != before {
                warn!(diagram:% = id; "Diagram scope dropped without exit, discarding it");
            }
        });
    }
}

/// Guard for an open cluster.
#[must_use = "dropping the scope closes the cluster immediately"]
#[derive(Debug)]
pub struct ClusterScope {
    cluster: Cluster,
    closed: bool,
    _not_send: PhantomData<*const ()>,
}

impl ClusterScope {
    /// Handle of the open cluster.
    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    /// Identifier of the open cluster.
    pub fn id(&self) -> Id {
        self.cluster.id()
    }

    /// Closes the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::ScopeMismatch`] if the cluster is not the
    /// innermost open cluster of the current diagram, and
    /// [`TrellisError::NoActiveDiagram`] if its diagram is already closed.
    pub fn exit(mut self) -> Result<Cluster, TrellisError> {
        let cluster = self.cluster;
        with_stack("exit_cluster", |stack| {
            let frame = stack.top_mut("exit_cluster")?;
            let innermost = frame.clusters.last().copied();
            if frame.diagram.id() != cluster.diagram() || innermost != Some(cluster.id()) {
                return Err(TrellisError::ScopeMismatch {
                    scope: ScopeKind::Cluster,
                    closing: cluster.id(),
                    innermost,
                });
            }
            frame.clusters.pop();
            Ok(())
        })?;
        self.closed = true;
        debug!(cluster:% = cluster.id(); "Cluster scope closed");
        Ok(cluster)
    }
}

impl Drop for ClusterScope {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let cluster = self.cluster;
        try_with_stack(|stack| {
            if let Some(frame) = stack.frame_mut(cluster.diagram()) {
                let before = frame.clusters.len();
                frame.clusters.retain(|id| *id != cluster.id());
                if frame.clusters.len() != before {
                    debug!(cluster:% = cluster.id(); "Cluster scope dropped, unwinding");
                }
            }
        });
    }
}

/// Opens a diagram and makes it current.
///
/// The scope renders with [`DotCommand`] unless another engine is set via
/// [`DiagramScope::with_engine`].
///
/// # Panics
///
/// Panics when called from the closure of [`with_current_diagram`].
pub fn enter_diagram(config: DiagramConfig) -> DiagramScope {
    let id = Id::sequenced("diagram", DIAGRAMS_OPENED.fetch_add(1, Ordering::Relaxed));
    CONTEXT.with(|ctx| {
        ctx.borrow_mut().frames.push(Frame {
            diagram: Diagram::new(id, config),
            clusters: Vec::new(),
        });
    });
    info!(diagram:% = id; "Diagram scope opened");

    DiagramScope {
        id,
        engine: Box::new(DotCommand::default()),
        closed: false,
        _not_send: PhantomData,
    }
}

/// Closes a diagram scope; see [`DiagramScope::exit`].
pub fn exit_diagram(scope: DiagramScope) -> Result<DiagramOutput, TrellisError> {
    scope.exit()
}

/// Opens a cluster under the current parent and makes it the current parent.
///
/// # Errors
///
/// Returns [`TrellisError::NoActiveDiagram`] outside a diagram scope,
/// [`TrellisError::InvalidLabel`] for an empty label and
/// [`TrellisError::ContextBusy`] inside [`with_current_diagram`].
pub fn enter_cluster(spec: ClusterSpec) -> Result<ClusterScope, TrellisError> {
    let cluster = with_stack("enter_cluster", |stack| {
        let frame = stack.top_mut("enter_cluster")?;
        if spec.label().is_empty() {
            return Err(TrellisError::InvalidLabel { entity: "cluster" });
        }
        let parent = frame.current_parent();
        let id = frame.diagram.add_cluster(parent, spec);
        frame.clusters.push(id);
        Ok(Cluster::from_parts(frame.diagram.id(), id))
    })?;
    debug!(cluster:% = cluster.id(); "Cluster scope opened");

    Ok(ClusterScope {
        cluster,
        closed: false,
        _not_send: PhantomData,
    })
}

/// Closes a cluster scope; see [`ClusterScope::exit`].
pub fn exit_cluster(scope: ClusterScope) -> Result<Cluster, TrellisError> {
    scope.exit()
}

/// Returns the identifier of the current diagram.
///
/// # Errors
///
/// Returns [`TrellisError::NoActiveDiagram`] when no diagram is open.
pub fn current_diagram() -> Result<Id, TrellisError> {
    read_stack(|stack| stack.top("current_diagram").map(|frame| frame.diagram.id()))
}

/// Returns the innermost open cluster, or the current diagram if none is open.
///
/// # Errors
///
/// Returns [`TrellisError::NoActiveDiagram`] when no diagram is open.
pub fn current_parent() -> Result<Parent, TrellisError> {
    read_stack(|stack| stack.top("current_parent").map(Frame::current_parent))
}

/// Returns `true` when no diagram is open on this thread.
pub fn is_idle() -> bool {
    read_stack(|stack| stack.frames.is_empty())
}

/// Runs `f` with read access to the current diagram.
///
/// The context stack is borrowed for the duration of the call. Queries such
/// as [`current_parent`] work inside `f`; declaring nodes, clusters or edges
/// fails with [`TrellisError::ContextBusy`].
///
/// # Errors
///
/// Returns [`TrellisError::NoActiveDiagram`] when no diagram is open.
pub fn with_current_diagram<R>(f: impl FnOnce(&Diagram) -> R) -> Result<R, TrellisError> {
    read_stack(|stack| {
        stack
            .top("with_current_diagram")
            .map(|frame| f(&frame.diagram))
    })
}

pub(crate) fn register_node(spec: NodeSpec) -> Result<Node, TrellisError> {
    with_stack("Node::declare", |stack| {
        let frame = stack.top_mut("Node::declare")?;
        if spec.label().is_empty() {
            return Err(TrellisError::InvalidLabel { entity: "node" });
        }
        let parent = frame.current_parent();
        let id = frame.diagram.add_node(parent, spec);
        Ok(Node::from_parts(frame.diagram.id(), id))
    })
}

/// Appends `edges` to the current diagram.
///
/// Every endpoint is checked before anything is appended, so a rejected batch
/// leaves the edge list unchanged.
pub(crate) fn append_edges(operation: &'static str, edges: &[Edge]) -> Result<(), TrellisError> {
    with_stack(operation, |stack| {
        let frame = stack.top_mut(operation)?;
        let diagram_id = frame.diagram.id();

        for edge in edges {
            for node in [edge.source(), edge.target()] {
                if node.diagram() != diagram_id || !frame.diagram.contains_node(node.id()) {
                    return Err(TrellisError::DanglingReference {
                        operation,
                        node: node.id(),
                        diagram: diagram_id,
                    });
                }
            }
        }

        for edge in edges {
            frame.diagram.push_edge(edge.clone());
        }
        Ok(())
    })
}
