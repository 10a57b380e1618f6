//! Editor session: one graph, one history, one selection.
//!
//! [`ProcessMapEditor`] is the entry point for the rendering layer. It
//! applies each request to the graph and decides when history commits
//! happen:
//!
//! - discrete edits (add, connect, delete, rename, batch ops, layout,
//!   clear) commit once when they change something
//! - node drags are coalesced per gesture (see [`crate::coalesce`])
//! - template loads and external loads reset history to a new entry 0
//!
//! Rejected or no-op requests never commit.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::canonical::graph_fingerprint;
use crate::coalesce::{CommitCoalescer, GestureKey};
use crate::config::EditorConfig;
use crate::history::HistoryManager;
use crate::ids::{IdProvider, UuidIdProvider};
use crate::layout::vertical_stack;
use crate::selection::{AlignAxis, DeleteSummary, Selection};
use crate::store::GraphStore;
use crate::suggest::{NodeSuggestion, SuggestionRequest, SuggestionSource};
use crate::template::{Template, TemplateError, TemplateLibrary};
use crate::types::{
    Edge, EdgeId, GraphError, Node, NodeId, NodeType, NodeUpdate, Position, ProcessGraph,
    ReplaceReport,
};

/// Error type for editor operations that reach an external collaborator.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Persistence backend failed.
    #[error("Store error: {0}")]
    StoreError(String),
    /// Suggestion service failed.
    #[error("Suggestion service error: {0}")]
    SuggestionError(String),
    /// Template lookup failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl EditorError {
    /// Create a store error from any error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::StoreError(e.to_string())
    }

    /// Create a suggestion error from any error type.
    pub fn from_suggestion<E: std::error::Error>(e: E) -> Self {
        Self::SuggestionError(e.to_string())
    }
}

/// Discrete events emitted by the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A node was dragged to a new position (one sample of a gesture).
    NodeMoved {
        /// Dragged node.
        id: NodeId,
        /// New position.
        position: Position,
    },
    /// The user's node selection changed.
    NodesSelected {
        /// Newly selected nodes.
        ids: Vec<NodeId>,
    },
    /// The user drew a connection.
    EdgeCreated {
        /// Source node.
        source: NodeId,
        /// Target node.
        target: NodeId,
    },
    /// The user deleted a node.
    NodeDeleted {
        /// Deleted node.
        id: NodeId,
    },
    /// The current continuous gesture (e.g. a drag) finished.
    GestureEnded,
}

/// What handling a [`CanvasEvent`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The graph changed and a history entry was committed.
    Committed,
    /// The graph changed; the commit waits for the gesture to end.
    Pending,
    /// A connection was created and committed.
    Connected(Edge),
    /// Nothing in the graph changed.
    Unchanged,
}

/// A process-map editing session.
///
/// Owns the live graph, its undo/redo log, the selection and the id
/// provider exclusively. Single-threaded; every mutation runs to
/// completion on the calling thread.
#[derive(Debug)]
pub struct ProcessMapEditor<I: IdProvider = UuidIdProvider> {
    graph: ProcessGraph,
    history: HistoryManager,
    selection: Selection,
    ids: I,
    config: EditorConfig,
    coalescer: CommitCoalescer,
    saved_fingerprint: Option<String>,
}

impl ProcessMapEditor<UuidIdProvider> {
    /// Create an editor over an empty graph with random ids.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_ids(config, UuidIdProvider)
    }
}

impl<I: IdProvider> ProcessMapEditor<I> {
    /// Create an editor over an empty graph with a custom id provider.
    pub fn with_ids(config: EditorConfig, ids: I) -> Self {
        Self::with_graph(ProcessGraph::new(), config, ids)
    }

    /// Create an editor seeded with `graph`, committed as history entry 0.
    pub fn with_graph(graph: ProcessGraph, config: EditorConfig, ids: I) -> Self {
        let (nodes, edges) = graph.into_parts();
        let graph = ProcessGraph::from_parts(nodes, edges);
        tracing::debug!(
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            config_hash = %config.config_hash(),
            "Opened editor session"
        );
        Self {
            history: HistoryManager::with_config(&graph, config.history.clone()),
            coalescer: CommitCoalescer::new(config.coalesce),
            graph,
            selection: Selection::new(),
            ids,
            config,
            saved_fingerprint: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read access
    // ─────────────────────────────────────────────────────────────────────

    /// The live graph.
    pub fn graph(&self) -> &ProcessGraph {
        &self.graph
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The undo/redo log.
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether [`undo`](Self::undo) would change the graph.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.coalescer.is_pending()
    }

    /// Whether [`redo`](Self::redo) would change the graph.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && !self.coalescer.is_pending()
    }

    /// Whether a drag gesture has uncommitted changes.
    pub fn has_pending_gesture(&self) -> bool {
        self.coalescer.is_pending()
    }

    /// Content fingerprint of the live graph.
    pub fn fingerprint(&self) -> String {
        graph_fingerprint(&self.graph)
    }

    /// Whether the live graph differs from the last saved or opened one.
    ///
    /// A session that was never saved is dirty as soon as it has content.
    pub fn is_dirty(&self) -> bool {
        match &self.saved_fingerprint {
            Some(saved) => *saved != self.fingerprint(),
            None => !self.graph.is_empty(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Commit plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn commit(&mut self, operation: &'static str) {
        self.coalescer.discard();
        self.history.commit(&self.graph);
        tracing::debug!(
            operation,
            entry = self.history.pointer(),
            nodes = self.graph.num_nodes(),
            edges = self.graph.num_edges(),
            "Committed history entry"
        );
    }

    /// Commit an open gesture before a discrete operation so the two land
    /// in separate history entries.
    fn flush_pending(&mut self) {
        if self.coalescer.finish() {
            self.commit("gesture");
        }
    }

    /// Replace the whole graph and drop any now-dangling selection ids.
    fn install(&mut self, graph: ProcessGraph) -> ReplaceReport {
        let (nodes, edges) = graph.into_parts();
        let report = self.graph.replace_all(nodes, edges);
        self.selection.retain_existing(&self.graph);
        report
    }

    // ─────────────────────────────────────────────────────────────────────
    // Graph edits
    // ─────────────────────────────────────────────────────────────────────

    /// Add a node. Blank labels and non-finite positions are ignored and
    /// return `None`.
    pub fn add_node(&mut self, node_type: NodeType, label: impl Into<String>, position: Position) -> Option<Node> {
        self.flush_pending();
        match self.graph.add_node(&mut self.ids, node_type, label, position) {
            Ok(node) => {
                self.commit("add_node");
                Some(node)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignored add_node");
                None
            }
        }
    }

    /// Remove nodes and their edges. Returns the number of nodes removed.
    pub fn remove_nodes(&mut self, ids: &BTreeSet<NodeId>) -> usize {
        self.flush_pending();
        let removed = self.graph.remove_nodes(ids);
        if removed > 0 {
            self.selection.retain_existing(&self.graph);
            self.commit("remove_nodes");
        }
        removed
    }

    /// Connect two nodes.
    ///
    /// Self-loops and missing endpoints return
    /// [`GraphError::InvalidConnection`] without committing.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<Edge, GraphError> {
        self.flush_pending();
        let edge = self.graph.connect(&mut self.ids, source, target)?;
        self.commit("connect");
        Ok(edge)
    }

    /// Remove edges. Returns the number removed.
    pub fn remove_edges(&mut self, ids: &BTreeSet<EdgeId>) -> usize {
        self.flush_pending();
        let removed = self.graph.remove_edges(ids);
        if removed > 0 {
            self.selection.retain_existing(&self.graph);
            self.commit("remove_edges");
        }
        removed
    }

    /// Apply a field update to a node. Unknown ids, blank labels and
    /// non-finite positions are ignored. Returns whether the graph changed.
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> bool {
        self.flush_pending();
        match self.graph.update_node(id, update) {
            Ok(()) => {
                self.commit("update_node");
                true
            }
            Err(e) => {
                tracing::debug!(node_id = %id, error = %e, "Ignored update_node");
                false
            }
        }
    }

    /// Set or clear an edge label. Returns whether the edge exists.
    pub fn set_edge_label(&mut self, id: &EdgeId, label: Option<String>) -> bool {
        self.flush_pending();
        match self.graph.set_edge_label(id, label) {
            Ok(()) => {
                self.commit("set_edge_label");
                true
            }
            Err(e) => {
                tracing::debug!(edge_id = %id, error = %e, "Ignored set_edge_label");
                false
            }
        }
    }

    /// Move a node as part of a drag gesture.
    ///
    /// The move is applied immediately; the commit waits until the gesture
    /// ends, another gesture starts, a discrete edit happens or the idle
    /// window passes. Returns whether the move was applied; unknown nodes
    /// and non-finite positions are ignored and leave any open gesture alone.
    pub fn move_node(&mut self, id: &NodeId, position: Position, now: Instant) -> bool {
        if !position.is_finite() || !self.graph.contains_node(id) {
            return false;
        }
        if self.coalescer.note_update(GestureKey::MoveNode(id.clone()), now) {
            // A different drag was still open; its final state is the
            // current graph, before this sample is applied.
            self.commit("gesture");
            self.coalescer.note_update(GestureKey::MoveNode(id.clone()), now);
        }
        match self.graph.update_node(id, NodeUpdate::Position(position)) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(node_id = %id, error = %e, "Move ignored");
                false
            }
        }
    }

    /// Close the open gesture. Returns whether a commit happened.
    pub fn end_gesture(&mut self) -> bool {
        if self.coalescer.finish() {
            self.commit("gesture");
            true
        } else {
            false
        }
    }

    /// Commit the open gesture if it has been idle long enough. Meant to be
    /// called from the UI loop. Returns whether a commit happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.coalescer.expire(now) {
            self.commit("gesture");
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Canvas events
    // ─────────────────────────────────────────────────────────────────────

    /// Translate a rendering-layer event into graph edits.
    pub fn handle(&mut self, event: CanvasEvent) -> Result<EventOutcome, GraphError> {
        self.handle_at(event, Instant::now())
    }

    /// [`handle`](Self::handle) with an explicit clock reading.
    pub fn handle_at(&mut self, event: CanvasEvent, now: Instant) -> Result<EventOutcome, GraphError> {
        let outcome = match event {
            CanvasEvent::NodeMoved { id, position } => {
                if self.move_node(&id, position, now) {
                    EventOutcome::Pending
                } else {
                    EventOutcome::Unchanged
                }
            }
            CanvasEvent::NodesSelected { ids } => {
                let graph = &self.graph;
                self.selection
                    .select_nodes(ids.into_iter().filter(|id| graph.contains_node(id)));
                EventOutcome::Unchanged
            }
            CanvasEvent::EdgeCreated { source, target } => {
                EventOutcome::Connected(self.connect(&source, &target)?)
            }
            CanvasEvent::NodeDeleted { id } => {
                if self.remove_nodes(&BTreeSet::from([id])) > 0 {
                    EventOutcome::Committed
                } else {
                    EventOutcome::Unchanged
                }
            }
            CanvasEvent::GestureEnded => {
                if self.end_gesture() {
                    EventOutcome::Committed
                } else {
                    EventOutcome::Unchanged
                }
            }
        };
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Undo / redo
    // ─────────────────────────────────────────────────────────────────────

    /// Step back one history entry. Returns whether the graph changed.
    ///
    /// An open gesture is committed first, so undo reverts the drag.
    pub fn undo(&mut self) -> bool {
        self.flush_pending();
        match self.history.undo() {
            Some(snapshot) => {
                self.graph = snapshot.clone();
                self.selection.retain_existing(&self.graph);
                tracing::debug!(entry = self.history.pointer(), "Undo");
                true
            }
            None => false,
        }
    }

    /// Step forward one history entry. Returns whether the graph changed.
    pub fn redo(&mut self) -> bool {
        self.flush_pending();
        match self.history.redo() {
            Some(snapshot) => {
                self.graph = snapshot.clone();
                self.selection.retain_existing(&self.graph);
                tracing::debug!(entry = self.history.pointer(), "Redo");
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection and batch operations
    // ─────────────────────────────────────────────────────────────────────

    /// Toggle a node's selection. Unknown ids are ignored.
    pub fn toggle_select_node(&mut self, id: &NodeId) -> bool {
        self.graph.contains_node(id) && self.selection.toggle_node(id.clone())
    }

    /// Toggle an edge's selection. Unknown ids are ignored.
    pub fn toggle_select_edge(&mut self, id: &EdgeId) -> bool {
        self.graph.contains_edge(id) && self.selection.toggle_edge(id.clone())
    }

    /// Select every node and edge.
    pub fn select_all(&mut self) {
        self.selection.select_all(&self.graph);
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Duplicate selected nodes at the configured offset. The duplicates
    /// become the selection. Returns their ids.
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        self.flush_pending();
        let offset = self.config.duplicate_offset;
        let created = self
            .selection
            .duplicate_selected(&mut self.graph, &mut self.ids, offset);
        if !created.is_empty() {
            self.commit("duplicate_selected");
        }
        created
    }

    /// Align selected nodes. Needs at least two. Returns whether the graph
    /// changed.
    pub fn align_selected(&mut self, axis: AlignAxis) -> bool {
        self.flush_pending();
        let aligned = self.selection.align_selected(&mut self.graph, axis);
        if aligned {
            self.commit("align_selected");
        }
        aligned
    }

    /// Delete selected nodes (with their edges) and selected edges.
    pub fn delete_selected(&mut self) -> DeleteSummary {
        self.flush_pending();
        let summary = self.selection.delete_selected(&mut self.graph);
        if !summary.is_empty() {
            self.commit("delete_selected");
        }
        summary
    }

    // ─────────────────────────────────────────────────────────────────────
    // Wholesale replacement
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the graph with a fresh instance of `template`.
    ///
    /// Clears the selection and resets history: the template becomes the
    /// new undo floor. Returns the template-local ids of skipped edges.
    pub fn load_template(&mut self, template: &Template) -> Vec<String> {
        let instantiation = template.instantiate(&mut self.ids);
        let (nodes, edges) = instantiation.graph.into_parts();
        self.graph.replace_all(nodes, edges);
        self.selection.clear();
        self.coalescer.discard();
        self.history.reset(&self.graph);
        tracing::info!(
            template = %template.name,
            nodes = self.graph.num_nodes(),
            edges = self.graph.num_edges(),
            skipped_edges = instantiation.skipped_edges.len(),
            "Loaded template"
        );
        instantiation.skipped_edges
    }

    /// Look up a template by name and load it.
    pub fn load_template_named(&mut self, library: &TemplateLibrary, name: &str) -> Result<Vec<String>, EditorError> {
        let template = library.get(name)?;
        Ok(self.load_template(template))
    }

    /// Stack all nodes into one column in insertion order.
    ///
    /// Returns whether any node moved; a layout that moves nothing does
    /// not commit.
    pub fn auto_layout(&mut self) -> bool {
        self.flush_pending();
        let laid_out = vertical_stack(self.graph.nodes(), &self.config.layout);
        if laid_out.as_slice() == self.graph.nodes() {
            return false;
        }
        let edges = self.graph.edges().to_vec();
        self.graph.replace_all(laid_out, edges);
        self.commit("auto_layout");
        true
    }

    /// Remove everything. Undoable. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        self.flush_pending();
        if self.graph.is_empty() {
            return false;
        }
        self.graph.clear();
        self.selection.clear();
        self.commit("clear");
        true
    }

    /// Replace the graph with externally loaded content and reset history
    /// to it.
    pub fn replace_graph(&mut self, graph: ProcessGraph) -> ReplaceReport {
        self.coalescer.discard();
        let report = self.install(graph);
        self.selection.clear();
        self.history.reset(&self.graph);
        report
    }

    // ─────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────

    /// Load a map from `store`.
    ///
    /// On success with content, the graph is replaced and history reset.
    /// Returns `false` (graph untouched) when the map has never been saved.
    /// On error the graph is untouched.
    pub async fn open<S: GraphStore>(&mut self, store: &S, map_id: &str) -> Result<bool, EditorError> {
        let loaded = store.load(map_id).await.map_err(EditorError::from_store)?;
        match loaded {
            Some(graph) => {
                let report = self.replace_graph(graph);
                self.saved_fingerprint = Some(self.fingerprint());
                tracing::info!(
                    map_id = %map_id,
                    nodes = self.graph.num_nodes(),
                    edges = self.graph.num_edges(),
                    sanitized = !report.is_clean(),
                    "Opened process map"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save the live graph to `store`. An open gesture is committed first.
    pub async fn save<S: GraphStore>(&mut self, store: &S, map_id: &str) -> Result<(), EditorError> {
        self.flush_pending();
        store
            .save(map_id, &self.graph)
            .await
            .map_err(EditorError::from_store)?;
        self.saved_fingerprint = Some(self.fingerprint());
        tracing::info!(map_id = %map_id, nodes = self.graph.num_nodes(), "Saved process map");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Suggestions
    // ─────────────────────────────────────────────────────────────────────

    /// Ask `source` for next-step suggestions for the live graph.
    pub async fn request_suggestions<S: SuggestionSource>(
        &self,
        source: &S,
        prompt: Option<String>,
    ) -> Result<Vec<NodeSuggestion>, EditorError> {
        let request = SuggestionRequest { prompt, graph: self.graph.clone() };
        source.suggest(&request).await.map_err(EditorError::from_suggestion)
    }

    /// Add a suggested step one row below the lowest node.
    pub fn apply_suggestion(&mut self, suggestion: &NodeSuggestion) -> Option<Node> {
        let position = self
            .graph
            .nodes()
            .iter()
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
            .map(|lowest| Position::new(lowest.position.x, lowest.position.y + self.config.layout.row_height))
            .unwrap_or_else(|| self.config.layout.slot(0));
        self.add_node(suggestion.node_type, suggestion.label.clone(), position)
    }

    /// Ask `source` for a complete map and install it. On error the graph
    /// is untouched.
    pub async fn generate<S: SuggestionSource>(
        &mut self,
        source: &S,
        prompt: Option<String>,
    ) -> Result<ReplaceReport, EditorError> {
        let request = SuggestionRequest { prompt, graph: self.graph.clone() };
        let generated = source.generate(&request).await.map_err(EditorError::from_suggestion)?;
        Ok(self.apply_generated(generated))
    }

    /// Install a generated map as an undoable edit.
    pub fn apply_generated(&mut self, graph: ProcessGraph) -> ReplaceReport {
        self.flush_pending();
        let report = self.install(graph);
        self.commit("apply_generated");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdProvider;
    use crate::store::InMemoryGraphStore;
    use std::time::Duration;

    fn editor() -> ProcessMapEditor<SequentialIdProvider> {
        ProcessMapEditor::with_ids(EditorConfig::default(), SequentialIdProvider::new())
    }

    #[test]
    fn test_blank_label_does_not_commit() {
        let mut editor = editor();
        assert!(editor.add_node(NodeType::Process, "", Position::default()).is_none());
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_invalid_connection_does_not_commit() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Start, "A", Position::default()).unwrap();

        assert!(editor.connect(&a.id, &a.id).is_err());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_drag_coalesces_into_one_commit() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Process, "A", Position::default()).unwrap();
        let t0 = Instant::now();

        for step in 1..=10 {
            let outcome = editor
                .handle_at(
                    CanvasEvent::NodeMoved { id: a.id.clone(), position: Position::new(step as f64, 0.0) },
                    t0 + Duration::from_millis(step * 16),
                )
                .unwrap();
            assert_eq!(outcome, EventOutcome::Pending);
        }
        assert_eq!(editor.history().len(), 2);

        assert_eq!(editor.handle(CanvasEvent::GestureEnded).unwrap(), EventOutcome::Committed);
        assert_eq!(editor.history().len(), 3);
        assert_eq!(editor.graph().node(&a.id).unwrap().position, Position::new(10.0, 0.0));

        assert!(editor.undo());
        assert_eq!(editor.graph().node(&a.id).unwrap().position, Position::default());
    }

    #[test]
    fn test_switching_drag_target_commits_previous() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Process, "A", Position::default()).unwrap();
        let b = editor.add_node(NodeType::Process, "B", Position::default()).unwrap();
        let now = Instant::now();

        editor.move_node(&a.id, Position::new(5.0, 5.0), now);
        editor.move_node(&b.id, Position::new(7.0, 7.0), now);
        assert_eq!(editor.history().len(), 4);

        editor.end_gesture();
        assert_eq!(editor.history().len(), 5);
        assert!(editor.undo());
        assert_eq!(editor.graph().node(&a.id).unwrap().position, Position::new(5.0, 5.0));
        assert_eq!(editor.graph().node(&b.id).unwrap().position, Position::default());
    }

    #[test]
    fn test_idle_tick_flushes_drag() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Process, "A", Position::default()).unwrap();
        let t0 = Instant::now();

        editor.move_node(&a.id, Position::new(1.0, 1.0), t0);
        assert!(!editor.tick(t0 + Duration::from_millis(100)));
        assert!(editor.tick(t0 + Duration::from_millis(600)));
        assert!(!editor.has_pending_gesture());
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_discrete_edit_flushes_open_drag_first() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Process, "A", Position::default()).unwrap();

        editor.move_node(&a.id, Position::new(3.0, 3.0), Instant::now());
        editor.update_node(&a.id, NodeUpdate::Label("Renamed".into()));

        assert_eq!(editor.history().len(), 4);
        assert!(editor.undo());
        assert_eq!(editor.graph().node(&a.id).unwrap().label, "A");
        assert_eq!(editor.graph().node(&a.id).unwrap().position, Position::new(3.0, 3.0));
    }

    #[test]
    fn test_moving_unknown_node_is_ignored() {
        let mut editor = editor();
        let outcome = editor
            .handle(CanvasEvent::NodeMoved { id: NodeId::new("ghost"), position: Position::default() })
            .unwrap();
        assert_eq!(outcome, EventOutcome::Unchanged);
        assert!(!editor.has_pending_gesture());
    }

    #[test]
    fn test_seeded_session_mints_unused_ids() {
        let mut seed_ids = SequentialIdProvider::new();
        let mut seeded = ProcessGraph::new();
        let a = seeded.add_node(&mut seed_ids, NodeType::Start, "A", Position::default()).unwrap();
        let b = seeded.add_node(&mut seed_ids, NodeType::End, "B", Position::new(0.0, 100.0)).unwrap();
        seeded.connect(&mut seed_ids, &a.id, &b.id).unwrap();

        let mut editor = ProcessMapEditor::with_graph(seeded, EditorConfig::default(), SequentialIdProvider::new());
        let added = editor.add_node(NodeType::Process, "C", Position::new(0.0, 200.0)).unwrap();
        assert!(added.id != a.id && added.id != b.id);
        assert_eq!(editor.graph().num_nodes(), 3);

        editor.select_all();
        let created = editor.duplicate_selected();

        assert_eq!(created.len(), 3);
        assert_eq!(editor.graph().num_nodes(), 6);
        let unique: BTreeSet<_> = editor.graph().nodes().iter().map(|n| n.id.clone()).collect();
        assert_eq!(unique.len(), 6);
        assert!(created.iter().all(|id| editor.graph().contains_node(id)));
        assert_eq!(editor.selection().node_ids(), &created.iter().cloned().collect::<BTreeSet<_>>());
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_non_finite_positions_do_not_commit() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Process, "A", Position::default()).unwrap();

        assert!(editor.add_node(NodeType::Process, "B", Position::new(f64::NAN, 0.0)).is_none());
        assert!(!editor.move_node(&a.id, Position::new(0.0, f64::INFINITY), Instant::now()));
        assert!(!editor.has_pending_gesture());
        assert!(!editor.update_node(&a.id, NodeUpdate::Position(Position::new(f64::NEG_INFINITY, 1.0))));

        assert_eq!(editor.graph().num_nodes(), 1);
        assert_eq!(editor.graph().node(&a.id).unwrap().position, Position::default());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_align_without_movement_does_not_commit() {
        let mut editor = editor();
        editor.add_node(NodeType::Process, "A", Position::new(0.0, 40.0)).unwrap();
        editor.add_node(NodeType::Process, "B", Position::new(90.0, 40.0)).unwrap();
        editor.select_all();

        assert!(!editor.align_selected(AlignAxis::Horizontal));
        assert_eq!(editor.history().len(), 3);

        assert!(editor.align_selected(AlignAxis::Vertical));
        assert_eq!(editor.history().len(), 4);
        assert!(!editor.align_selected(AlignAxis::Vertical));
        assert_eq!(editor.history().len(), 4);
    }

    #[test]
    fn test_nodes_selected_filters_unknown_ids() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Process, "A", Position::default()).unwrap();

        editor
            .handle(CanvasEvent::NodesSelected { ids: vec![a.id.clone(), NodeId::new("ghost")] })
            .unwrap();

        assert_eq!(editor.selection().node_ids(), &BTreeSet::from([a.id]));
    }

    #[test]
    fn test_undo_revalidates_selection() {
        let mut editor = editor();
        editor.add_node(NodeType::Start, "A", Position::default()).unwrap();
        let b = editor.add_node(NodeType::End, "B", Position::default()).unwrap();
        editor.toggle_select_node(&b.id);

        assert!(editor.undo());
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_template_load_resets_history() {
        let mut editor = editor();
        editor.add_node(NodeType::Start, "Old", Position::default()).unwrap();
        editor.select_all();

        let skipped = editor
            .load_template_named(&TemplateLibrary::builtin(), "corrective-action-plan")
            .unwrap();

        assert!(skipped.is_empty());
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.undo());
        assert!(editor.selection().is_empty());
        assert_eq!(editor.graph().num_nodes(), 5);
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let mut editor = editor();
        let err = editor.load_template_named(&TemplateLibrary::builtin(), "nope").unwrap_err();
        assert!(matches!(err, EditorError::Template(TemplateError::UnknownTemplate(_))));
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_auto_layout_commits_once_and_is_idempotent() {
        let mut editor = editor();
        let a = editor.add_node(NodeType::Start, "A", Position::new(999.0, 3.0)).unwrap();
        let b = editor.add_node(NodeType::End, "B", Position::new(-4.0, 0.0)).unwrap();
        editor.connect(&a.id, &b.id).unwrap();
        let edges_before = editor.graph().edges().to_vec();

        assert!(editor.auto_layout());
        assert_eq!(editor.history().len(), 5);
        assert_eq!(editor.graph().node(&a.id).unwrap().position, Position::new(250.0, 50.0));
        assert_eq!(editor.graph().node(&b.id).unwrap().position, Position::new(250.0, 200.0));
        assert_eq!(editor.graph().edges(), edges_before.as_slice());

        assert!(!editor.auto_layout());
        assert_eq!(editor.history().len(), 5);
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut editor = editor();
        editor.add_node(NodeType::Start, "A", Position::default()).unwrap();

        assert!(editor.clear());
        assert!(editor.graph().is_empty());
        assert!(!editor.clear());
        assert_eq!(editor.history().len(), 3);

        assert!(editor.undo());
        assert_eq!(editor.graph().num_nodes(), 1);
    }

    #[test]
    fn test_apply_suggestion_places_below_lowest_node() {
        let mut editor = editor();
        editor.add_node(NodeType::Start, "A", Position::new(100.0, 400.0)).unwrap();
        editor.add_node(NodeType::Process, "B", Position::new(300.0, 50.0)).unwrap();

        let node = editor
            .apply_suggestion(&NodeSuggestion::new(NodeType::End, "Archive", "closes the loop"))
            .unwrap();

        assert_eq!(node.position, Position::new(100.0, 550.0));
        assert_eq!(node.node_type, NodeType::End);
    }

    #[test]
    fn test_apply_generated_is_undoable() {
        let mut editor = editor();
        editor.add_node(NodeType::Start, "Mine", Position::default()).unwrap();
        let mut ids = SequentialIdProvider::with_prefix("gen-");
        let generated = TemplateLibrary::builtin()
            .get("incident-review")
            .unwrap()
            .instantiate(&mut ids)
            .graph;

        let report = editor.apply_generated(generated);

        assert!(report.is_clean());
        assert_eq!(editor.graph().num_nodes(), 6);
        assert!(editor.undo());
        assert_eq!(editor.graph().nodes()[0].label, "Mine");
    }

    #[tokio::test]
    async fn test_save_marks_clean_and_open_resets_history() {
        let store = InMemoryGraphStore::new();
        let mut editor = editor();
        editor.add_node(NodeType::Start, "A", Position::default()).unwrap();
        assert!(editor.is_dirty());

        editor.save(&store, "map").await.unwrap();
        assert!(!editor.is_dirty());

        editor.add_node(NodeType::End, "B", Position::default()).unwrap();
        assert!(editor.is_dirty());

        let mut reopened = ProcessMapEditor::with_ids(EditorConfig::default(), SequentialIdProvider::with_prefix("r-"));
        assert!(reopened.open(&store, "map").await.unwrap());
        assert_eq!(reopened.graph().num_nodes(), 1);
        assert_eq!(reopened.history().len(), 1);
        assert!(!reopened.is_dirty());
    }

    #[tokio::test]
    async fn test_rejected_non_finite_move_keeps_map_reopenable() {
        let store = InMemoryGraphStore::new();
        let mut session = editor();
        let a = session.add_node(NodeType::Start, "A", Position::new(5.0, 5.0)).unwrap();
        session.move_node(&a.id, Position::new(f64::NAN, f64::NAN), Instant::now());
        session.save(&store, "map").await.unwrap();

        let mut reopened = editor();
        assert!(reopened.open(&store, "map").await.unwrap());
        assert_eq!(reopened.graph().node(&a.id).unwrap().position, Position::new(5.0, 5.0));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_dirty_state() {
        let store = InMemoryGraphStore::new();
        store.set_read_only(true);
        let mut editor = editor();
        editor.add_node(NodeType::Start, "A", Position::default()).unwrap();

        let err = editor.save(&store, "map").await.unwrap_err();
        assert!(matches!(err, EditorError::StoreError(_)));
        assert!(editor.is_dirty());
    }

    #[tokio::test]
    async fn test_open_missing_map_leaves_graph() {
        let store = InMemoryGraphStore::new();
        let mut editor = editor();
        editor.add_node(NodeType::Start, "A", Position::default()).unwrap();

        assert!(!editor.open(&store, "missing").await.unwrap());
        assert_eq!(editor.graph().num_nodes(), 1);
        assert_eq!(editor.history().len(), 2);
    }
}
