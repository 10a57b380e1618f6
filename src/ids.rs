//! Id minting for nodes and edges.
//!
//! Every fresh id in the editor comes from an [`IdProvider`], so tests can
//! swap the random production generator for a deterministic counter.

use uuid::Uuid;

use crate::types::{EdgeId, NodeId};

/// Source of fresh, globally unique node and edge ids.
pub trait IdProvider {
    /// Mint a new node id.
    fn next_node_id(&mut self) -> NodeId;

    /// Mint a new edge id.
    fn next_edge_id(&mut self) -> EdgeId;
}

impl<T: IdProvider + ?Sized> IdProvider for &mut T {
    fn next_node_id(&mut self) -> NodeId {
        (**self).next_node_id()
    }

    fn next_edge_id(&mut self) -> EdgeId {
        (**self).next_edge_id()
    }
}

impl<T: IdProvider + ?Sized> IdProvider for Box<T> {
    fn next_node_id(&mut self) -> NodeId {
        (**self).next_node_id()
    }

    fn next_edge_id(&mut self) -> EdgeId {
        (**self).next_edge_id()
    }
}

/// Random v4 UUID ids. Production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn next_node_id(&mut self) -> NodeId {
        NodeId::new(format!("node-{}", Uuid::new_v4()))
    }

    fn next_edge_id(&mut self) -> EdgeId {
        EdgeId::new(format!("edge-{}", Uuid::new_v4()))
    }
}

/// Monotonic counter ids (`{prefix}node-1`, `{prefix}edge-2`, ...).
///
/// Node and edge ids share one counter, so a sequence of operations
/// always yields the same ids.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdProvider {
    prefix: String,
    next: u64,
}

impl SequentialIdProvider {
    /// Create a counter starting at 1 with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter whose ids start with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Number of ids minted so far.
    pub fn issued(&self) -> u64 {
        self.next
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl IdProvider for SequentialIdProvider {
    fn next_node_id(&mut self) -> NodeId {
        let n = self.bump();
        NodeId::new(format!("{}node-{}", self.prefix, n))
    }

    fn next_edge_id(&mut self) -> EdgeId {
        let n = self.bump();
        EdgeId::new(format!("{}edge-{}", self.prefix, n))
    }
}
