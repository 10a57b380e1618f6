//! The canonical node/edge collections and their mutation primitives.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId, NodeType, NodeUpdate, Position};
use crate::ids::IdProvider;

/// Fresh ids drawn from a provider before giving up on finding an unused one.
const MAX_MINT_ATTEMPTS: usize = 1024;

/// Error type for graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Self-loop or an endpoint missing from the graph.
    #[error("Invalid connection {from} -> {to}: {reason}")]
    InvalidConnection {
        /// Requested source node.
        from: NodeId,
        /// Requested target node.
        to: NodeId,
        /// Why the connection was rejected.
        reason: ConnectionRejection,
    },
    /// Add or rename with blank text.
    #[error("Label must not be blank")]
    EmptyLabel,
    /// Add or move to a NaN or infinite coordinate.
    #[error("Position must have finite coordinates")]
    InvalidPosition,
    /// The id provider kept returning ids already present in the graph.
    #[error("No unused id after {0} attempts")]
    IdsExhausted(usize),
    /// Node id absent from the graph.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    /// Edge id absent from the graph.
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),
}

impl GraphError {
    /// Whether the error is a silent no-op condition rather than something
    /// the caller should surface to the user.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::EmptyLabel | Self::InvalidPosition | Self::NodeNotFound(_) | Self::EdgeNotFound(_)
        )
    }
}

/// Reason a connection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionRejection {
    /// Source and target are the same node.
    SelfLoop,
    /// The source node does not exist.
    MissingSource,
    /// The target node does not exist.
    MissingTarget,
}

impl std::fmt::Display for ConnectionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfLoop => write!(f, "self-loop"),
            Self::MissingSource => write!(f, "source node does not exist"),
            Self::MissingTarget => write!(f, "target node does not exist"),
        }
    }
}

/// What [`ProcessGraph::replace_all`] had to discard to keep the graph valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    /// Nodes dropped because their id was already taken.
    pub duplicate_nodes: usize,
    /// Edges dropped because their id was already taken.
    pub duplicate_edges: usize,
    /// Edges dropped because an endpoint was missing.
    pub dangling_edges: usize,
    /// Edges dropped because source and target were the same node.
    pub self_loops: usize,
    /// Nodes dropped because a coordinate was NaN or infinite.
    pub invalid_positions: usize,
}

impl ReplaceReport {
    /// Whether the replacement content was accepted as-is.
    pub fn is_clean(&self) -> bool {
        self.duplicate_nodes == 0
            && self.duplicate_edges == 0
            && self.dangling_edges == 0
            && self.self_loops == 0
            && self.invalid_positions == 0
    }
}

/// A process map: ordered nodes and edges.
///
/// Node order is insertion order and doubles as the auto-layout key.
///
/// ## Invariants
///
/// - Every edge's `source` and `target` exist in `nodes`.
/// - Node ids are unique; edge ids are unique.
///
/// Cloning is a deep copy, which is what history snapshots rely on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl ProcessGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from raw content, sanitizing it the same way
    /// [`replace_all`](Self::replace_all) does.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut graph = Self::new();
        graph.replace_all(nodes, edges);
        graph
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes (and therefore no edges).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Look up an edge.
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    /// Whether a node with this id exists.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Whether an edge with this id exists.
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Edges with `id` as source or target.
    pub fn edges_touching<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Add a node with a freshly minted id.
    ///
    /// A blank label is rejected with [`GraphError::EmptyLabel`], a
    /// non-finite position with [`GraphError::InvalidPosition`]; both leave
    /// the graph unchanged.
    pub fn add_node<I: IdProvider + ?Sized>(
        &mut self,
        ids: &mut I,
        node_type: NodeType,
        label: impl Into<String>,
        position: Position,
    ) -> Result<Node, GraphError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(GraphError::EmptyLabel);
        }
        if !position.is_finite() {
            return Err(GraphError::InvalidPosition);
        }

        let node = Node::new(self.fresh_node_id(ids)?, node_type, label, position);
        self.nodes.push(node.clone());
        Ok(node)
    }

    /// Draw node ids from `ids` until one is not used by this graph.
    ///
    /// Providers are not required to know what the graph already holds (a
    /// counter restarted over opened content repeats ids), so taken ids are
    /// skipped.
    pub fn fresh_node_id<I: IdProvider + ?Sized>(&self, ids: &mut I) -> Result<NodeId, GraphError> {
        for _ in 0..MAX_MINT_ATTEMPTS {
            let id = ids.next_node_id();
            if !self.contains_node(&id) {
                return Ok(id);
            }
            tracing::debug!(node_id = %id, "Skipped node id already in use");
        }
        Err(GraphError::IdsExhausted(MAX_MINT_ATTEMPTS))
    }

    /// Draw edge ids from `ids` until one is not used by this graph.
    pub fn fresh_edge_id<I: IdProvider + ?Sized>(&self, ids: &mut I) -> Result<EdgeId, GraphError> {
        for _ in 0..MAX_MINT_ATTEMPTS {
            let id = ids.next_edge_id();
            if !self.contains_edge(&id) {
                return Ok(id);
            }
            tracing::debug!(edge_id = %id, "Skipped edge id already in use");
        }
        Err(GraphError::IdsExhausted(MAX_MINT_ATTEMPTS))
    }

    /// Append an already-built node (e.g. a duplicate).
    ///
    /// Returns `false` without inserting if the id is already taken or the
    /// position is not finite.
    pub fn insert_node(&mut self, node: Node) -> bool {
        if !node.position.is_finite() || self.contains_node(&node.id) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Remove nodes and cascade-remove every edge touching them.
    ///
    /// Returns the number of nodes removed. Unknown ids are ignored.
    pub fn remove_nodes(&mut self, ids: &BTreeSet<NodeId>) -> usize {
        if ids.is_empty() {
            return 0;
        }

        let before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
        before - self.nodes.len()
    }

    /// Create a directed edge from `source` to `target`.
    ///
    /// Rejects self-loops and missing endpoints. Parallel edges between the
    /// same pair are permitted.
    pub fn connect<I: IdProvider + ?Sized>(
        &mut self,
        ids: &mut I,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<Edge, GraphError> {
        let rejection = if source == target {
            Some(ConnectionRejection::SelfLoop)
        } else if !self.contains_node(source) {
            Some(ConnectionRejection::MissingSource)
        } else if !self.contains_node(target) {
            Some(ConnectionRejection::MissingTarget)
        } else {
            None
        };

        if let Some(reason) = rejection {
            return Err(GraphError::InvalidConnection {
                from: source.clone(),
                to: target.clone(),
                reason,
            });
        }

        let edge = Edge::new(self.fresh_edge_id(ids)?, source.clone(), target.clone());
        self.edges.push(edge.clone());
        Ok(edge)
    }

    /// Remove edges by id. Returns the number removed.
    pub fn remove_edges(&mut self, ids: &BTreeSet<EdgeId>) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !ids.contains(&e.id));
        before - self.edges.len()
    }

    /// Apply a single field update to a node.
    ///
    /// Blank labels and non-finite positions are rejected without touching
    /// the node.
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> Result<(), GraphError> {
        match &update {
            NodeUpdate::Label(label) if label.trim().is_empty() => return Err(GraphError::EmptyLabel),
            NodeUpdate::Position(position) if !position.is_finite() => {
                return Err(GraphError::InvalidPosition)
            }
            _ => {}
        }

        let node = self
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;

        match update {
            NodeUpdate::Label(label) => node.label = label,
            NodeUpdate::Type(node_type) => node.node_type = node_type,
            NodeUpdate::Position(position) => node.position = position,
            NodeUpdate::CustomColor(color) => node.custom_color = color,
        }
        Ok(())
    }

    /// Set or clear an edge's branch label.
    pub fn set_edge_label(&mut self, id: &EdgeId, label: Option<String>) -> Result<(), GraphError> {
        let edge = self
            .edges
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        edge.label = label.filter(|l| !l.trim().is_empty());
        Ok(())
    }

    /// Atomically replace all content.
    ///
    /// Incoming content is sanitized so the invariants hold afterwards:
    /// repeated node ids keep their first occurrence, repeated edge ids
    /// keep their first occurrence, nodes with a non-finite position are
    /// dropped, and self-loops or edges with a missing endpoint are dropped.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> ReplaceReport {
        let mut report = ReplaceReport::default();

        let mut node_ids: HashSet<NodeId> = HashSet::with_capacity(nodes.len());
        let mut kept_nodes = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !node.position.is_finite() {
                report.invalid_positions += 1;
            } else if node_ids.insert(node.id.clone()) {
                kept_nodes.push(node);
            } else {
                report.duplicate_nodes += 1;
            }
        }

        let mut edge_ids: HashSet<EdgeId> = HashSet::with_capacity(edges.len());
        let mut kept_edges = Vec::with_capacity(edges.len());
        for edge in edges {
            if !node_ids.contains(&edge.source) || !node_ids.contains(&edge.target) {
                report.dangling_edges += 1;
            } else if edge.source == edge.target {
                report.self_loops += 1;
            } else if !edge_ids.insert(edge.id.clone()) {
                report.duplicate_edges += 1;
            } else {
                kept_edges.push(edge);
            }
        }

        if !report.is_clean() {
            tracing::warn!(
                duplicate_nodes = report.duplicate_nodes,
                duplicate_edges = report.duplicate_edges,
                dangling_edges = report.dangling_edges,
                self_loops = report.self_loops,
                invalid_positions = report.invalid_positions,
                "Replacement graph content was sanitized"
            );
        }

        self.nodes = kept_nodes;
        self.edges = kept_edges;
        report
    }

    /// Remove all content.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Consume the graph, returning its parts.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }
}
