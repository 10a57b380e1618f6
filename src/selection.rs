//! Selection tracking and batch operations over the selected items.
//!
//! The selection holds only ids. It never lives inside the graph, so
//! history snapshots stay free of transient UI state. After any wholesale
//! graph replacement call [`Selection::retain_existing`] (or
//! [`Selection::clear`]) so no dangling ids survive.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::IdProvider;
use crate::types::{EdgeId, Node, NodeId, NodeUpdate, Position, ProcessGraph};

/// Axis along which [`Selection::align_selected`] lines nodes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignAxis {
    /// Share one `y` (nodes form a row).
    Horizontal,
    /// Share one `x` (nodes form a column).
    Vertical,
}

/// Outcome of [`Selection::delete_selected`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Nodes removed.
    pub nodes: usize,
    /// Edges removed, including those cascaded from removed nodes.
    pub edges: usize,
}

impl DeleteSummary {
    /// Whether anything was removed.
    pub fn is_empty(&self) -> bool {
        self.nodes == 0 && self.edges == 0
    }
}

/// The set of currently selected node and edge ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: BTreeSet<NodeId>,
    edges: BTreeSet<EdgeId>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected node ids.
    pub fn node_ids(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Selected edge ids.
    pub fn edge_ids(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Whether a node is selected.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Whether an edge is selected.
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains(id)
    }

    /// Flip a node's membership. Returns whether it is now selected.
    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        if self.nodes.remove(&id) {
            false
        } else {
            self.nodes.insert(id);
            true
        }
    }

    /// Flip an edge's membership. Returns whether it is now selected.
    pub fn toggle_edge(&mut self, id: EdgeId) -> bool {
        if self.edges.remove(&id) {
            false
        } else {
            self.edges.insert(id);
            true
        }
    }

    /// Replace the node selection. Edge selection is kept.
    pub fn select_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.nodes = ids.into_iter().collect();
    }

    /// Select every node and edge of `graph`.
    pub fn select_all(&mut self, graph: &ProcessGraph) {
        self.nodes = graph.nodes().iter().map(|n| n.id.clone()).collect();
        self.edges = graph.edges().iter().map(|e| e.id.clone()).collect();
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Drop ids that no longer exist in `graph`.
    pub fn retain_existing(&mut self, graph: &ProcessGraph) {
        self.nodes.retain(|id| graph.contains_node(id));
        self.edges.retain(|id| graph.contains_edge(id));
    }

    /// Selected nodes that exist in `graph`, in graph order.
    pub fn selected_nodes<'a>(&'a self, graph: &'a ProcessGraph) -> impl Iterator<Item = &'a Node> + 'a {
        graph.nodes().iter().filter(move |n| self.nodes.contains(&n.id))
    }

    /// Clone every selected node with a fresh id, shifted by `offset`.
    ///
    /// Clones keep their label, type and color and are appended in graph
    /// order. Edges are not duplicated, not even those between two selected
    /// nodes. The clones replace the selection. Returns the ids actually
    /// inserted; an empty result means nothing changed, selection included.
    pub fn duplicate_selected<I: IdProvider + ?Sized>(
        &mut self,
        graph: &mut ProcessGraph,
        ids: &mut I,
        offset: Position,
    ) -> Vec<NodeId> {
        let originals: Vec<Node> = self.selected_nodes(graph).cloned().collect();
        if originals.is_empty() {
            return Vec::new();
        }

        let mut created = Vec::with_capacity(originals.len());
        for original in originals {
            let id = match graph.fresh_node_id(ids) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(error = %e, "Stopped duplicating selection");
                    break;
                }
            };
            let clone = Node {
                id: id.clone(),
                position: original.position.offset_by(offset),
                ..original
            };
            if graph.insert_node(clone) {
                created.push(id);
            }
        }

        if !created.is_empty() {
            self.clear();
            self.nodes.extend(created.iter().cloned());
        }
        created
    }

    /// Line up selected nodes on the mean coordinate of `axis`.
    ///
    /// Needs at least two selected nodes; otherwise nothing changes.
    /// Returns whether any node actually moved.
    pub fn align_selected(&self, graph: &mut ProcessGraph, axis: AlignAxis) -> bool {
        let selected: Vec<(NodeId, Position)> = self
            .selected_nodes(graph)
            .map(|n| (n.id.clone(), n.position))
            .collect();
        if selected.len() < 2 {
            return false;
        }

        let count = selected.len() as f64;
        let mean = match axis {
            AlignAxis::Horizontal => selected.iter().map(|(_, p)| p.y).sum::<f64>() / count,
            AlignAxis::Vertical => selected.iter().map(|(_, p)| p.x).sum::<f64>() / count,
        };

        let mut moved = 0;
        for (id, position) in selected {
            let aligned = match axis {
                AlignAxis::Horizontal => Position::new(position.x, mean),
                AlignAxis::Vertical => Position::new(mean, position.y),
            };
            if aligned == position {
                continue;
            }
            match graph.update_node(&id, NodeUpdate::Position(aligned)) {
                Ok(()) => moved += 1,
                Err(e) => tracing::debug!(node_id = %id, error = %e, "Skipped aligning node"),
            }
        }
        moved > 0
    }

    /// Remove selected nodes (cascading their edges) and selected edges,
    /// then clear the selection.
    pub fn delete_selected(&mut self, graph: &mut ProcessGraph) -> DeleteSummary {
        let edges_before = graph.num_edges();
        let nodes = graph.remove_nodes(&self.nodes);
        graph.remove_edges(&self.edges);
        let summary = DeleteSummary {
            nodes,
            edges: edges_before - graph.num_edges(),
        };
        self.clear();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdProvider;
    use crate::types::NodeType;

    fn graph_with_ys(ys: &[f64]) -> (ProcessGraph, SequentialIdProvider, Vec<NodeId>) {
        let mut ids = SequentialIdProvider::new();
        let mut graph = ProcessGraph::new();
        let nodes = ys
            .iter()
            .enumerate()
            .map(|(i, y)| {
                graph
                    .add_node(&mut ids, NodeType::Process, format!("Step {i}"), Position::new(i as f64 * 10.0, *y))
                    .unwrap()
                    .id
            })
            .collect();
        (graph, ids, nodes)
    }

    #[test]
    fn test_toggle_is_involution() {
        let mut selection = Selection::new();
        assert!(selection.toggle_node(NodeId::new("a")));
        assert!(selection.contains_node(&NodeId::new("a")));
        assert!(!selection.toggle_node(NodeId::new("a")));
        assert!(selection.is_empty());

        assert!(selection.toggle_edge(EdgeId::new("e")));
        assert!(selection.contains_edge(&EdgeId::new("e")));
    }

    #[test]
    fn test_select_all_and_retain_existing() {
        let (mut graph, mut ids, nodes) = graph_with_ys(&[0.0, 1.0, 2.0]);
        graph.connect(&mut ids, &nodes[0], &nodes[1]).unwrap();

        let mut selection = Selection::new();
        selection.select_all(&graph);
        assert_eq!(selection.node_ids().len(), 3);
        assert_eq!(selection.edge_ids().len(), 1);

        graph.remove_nodes(&BTreeSet::from([nodes[0].clone()]));
        selection.retain_existing(&graph);
        assert_eq!(selection.node_ids().len(), 2);
        assert!(selection.edge_ids().is_empty());
    }

    #[test]
    fn test_duplicate_offsets_and_reselects() {
        let (mut graph, mut ids, nodes) = graph_with_ys(&[40.0]);
        let mut selection = Selection::new();
        selection.toggle_node(nodes[0].clone());

        let created = selection.duplicate_selected(&mut graph, &mut ids, Position::new(50.0, 50.0));

        assert_eq!(created.len(), 1);
        assert_ne!(created[0], nodes[0]);
        let original = graph.node(&nodes[0]).unwrap();
        let clone = graph.node(&created[0]).unwrap();
        assert_eq!(original.position, Position::new(0.0, 40.0));
        assert_eq!(clone.position, Position::new(50.0, 90.0));
        assert_eq!(clone.label, original.label);
        assert_eq!(selection.node_ids(), &BTreeSet::from([created[0].clone()]));
    }

    #[test]
    fn test_duplicate_does_not_copy_edges() {
        let (mut graph, mut ids, nodes) = graph_with_ys(&[0.0, 100.0]);
        graph.connect(&mut ids, &nodes[0], &nodes[1]).unwrap();
        let mut selection = Selection::new();
        selection.select_nodes(nodes.clone());

        selection.duplicate_selected(&mut graph, &mut ids, Position::new(50.0, 50.0));

        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.num_edges(), 1);
    }

    #[test]
    fn test_duplicate_with_empty_selection_is_noop() {
        let (mut graph, mut ids, _) = graph_with_ys(&[0.0]);
        let before = graph.clone();

        let created = Selection::new().duplicate_selected(&mut graph, &mut ids, Position::new(50.0, 50.0));

        assert!(created.is_empty());
        assert_eq!(graph, before);
    }

    #[test]
    fn test_align_horizontal_uses_mean_y() {
        let (mut graph, _, nodes) = graph_with_ys(&[10.0, 20.0, 30.0]);
        let mut selection = Selection::new();
        selection.select_nodes(nodes.clone());

        assert!(selection.align_selected(&mut graph, AlignAxis::Horizontal));

        for (i, id) in nodes.iter().enumerate() {
            let node = graph.node(id).unwrap();
            assert_eq!(node.position.y, 20.0);
            assert_eq!(node.position.x, i as f64 * 10.0);
        }
    }

    #[test]
    fn test_align_vertical_uses_mean_x() {
        let (mut graph, _, nodes) = graph_with_ys(&[5.0, 6.0]);
        let mut selection = Selection::new();
        selection.select_nodes(nodes.clone());

        selection.align_selected(&mut graph, AlignAxis::Vertical);

        assert_eq!(graph.node(&nodes[0]).unwrap().position, Position::new(5.0, 5.0));
        assert_eq!(graph.node(&nodes[1]).unwrap().position, Position::new(5.0, 6.0));
    }

    #[test]
    fn test_align_already_aligned_reports_no_change() {
        let (mut graph, _, nodes) = graph_with_ys(&[30.0, 30.0]);
        let before = graph.clone();
        let mut selection = Selection::new();
        selection.select_nodes(nodes);

        assert!(!selection.align_selected(&mut graph, AlignAxis::Horizontal));
        assert_eq!(graph, before);
    }

    #[test]
    fn test_duplicate_over_restarted_ids_reports_only_inserted() {
        let (mut graph, _, nodes) = graph_with_ys(&[0.0, 100.0]);
        let mut ids = SequentialIdProvider::new();
        let mut selection = Selection::new();
        selection.select_nodes(nodes.clone());

        let created = selection.duplicate_selected(&mut graph, &mut ids, Position::new(50.0, 50.0));

        assert_eq!(created, vec![NodeId::new("node-3"), NodeId::new("node-4")]);
        assert_eq!(graph.num_nodes(), 4);
        assert!(created.iter().all(|id| !nodes.contains(id)));
        assert_eq!(selection.node_ids(), &created.iter().cloned().collect::<BTreeSet<_>>());
        assert_eq!(graph.node(&created[0]).unwrap().position, Position::new(50.0, 50.0));
    }

    #[test]
    fn test_duplicate_overflowing_offset_keeps_selection() {
        let (mut graph, mut ids, nodes) = graph_with_ys(&[f64::MAX]);
        let before = graph.clone();
        let mut selection = Selection::new();
        selection.toggle_node(nodes[0].clone());

        let created = selection.duplicate_selected(&mut graph, &mut ids, Position::new(0.0, f64::MAX));

        assert!(created.is_empty());
        assert_eq!(graph, before);
        assert_eq!(selection.node_ids(), &BTreeSet::from([nodes[0].clone()]));
    }

    #[test]
    fn test_align_requires_two_nodes() {
        let (mut graph, _, nodes) = graph_with_ys(&[10.0, 20.0]);
        let mut selection = Selection::new();
        selection.toggle_node(nodes[0].clone());
        selection.toggle_node(NodeId::new("stale"));

        assert!(!selection.align_selected(&mut graph, AlignAxis::Horizontal));
        assert_eq!(graph.node(&nodes[0]).unwrap().position.y, 10.0);
    }

    #[test]
    fn test_delete_selected_cascades_and_clears() {
        let (mut graph, mut ids, nodes) = graph_with_ys(&[0.0, 1.0, 2.0]);
        graph.connect(&mut ids, &nodes[0], &nodes[1]).unwrap();
        let kept = graph.connect(&mut ids, &nodes[1], &nodes[2]).unwrap();
        let doomed = graph.connect(&mut ids, &nodes[2], &nodes[1]).unwrap();

        let mut selection = Selection::new();
        selection.toggle_node(nodes[0].clone());
        selection.toggle_edge(doomed.id.clone());

        let summary = selection.delete_selected(&mut graph);

        assert_eq!(summary, DeleteSummary { nodes: 1, edges: 2 });
        assert_eq!(graph.edges(), &[kept]);
        assert!(selection.is_empty());
    }
}
