//! Deterministic auto-layout.
//!
//! Nodes are stacked in a single column in insertion order, so the map
//! reads top to bottom in the order steps were added. Edges are never
//! consulted.

use serde::{Deserialize, Serialize};

use crate::types::{Node, Position};

/// Vertical-stack layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Shared `x` coordinate of every node.
    pub column_x: f64,
    /// Vertical distance between consecutive nodes. Must be positive.
    pub row_height: f64,
    /// `y` coordinate of the first node.
    pub top_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_x: 250.0,
            row_height: 150.0,
            top_margin: 50.0,
        }
    }
}

impl LayoutConfig {
    /// Position of the node at `index` in the stack.
    pub fn slot(&self, index: usize) -> Position {
        Position::new(self.column_x, self.top_margin + index as f64 * self.row_height)
    }

    /// Whether the configuration keeps `y` strictly increasing.
    pub fn is_valid(&self) -> bool {
        self.row_height.is_finite()
            && self.row_height > 0.0
            && self.column_x.is_finite()
            && self.top_margin.is_finite()
    }
}

/// Return `nodes` repositioned into a single column.
///
/// Node `i` lands at `(column_x, top_margin + i * row_height)`. Ids, labels
/// and every other field are untouched, as is the order.
pub fn vertical_stack(nodes: &[Node], config: &LayoutConfig) -> Vec<Node> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| Node {
            position: config.slot(i),
            ..node.clone()
        })
        .collect()
}
