//! Node types for the process map.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node in the process map.
///
/// Opaque string minted by an [`IdProvider`](crate::ids::IdProvider).
/// Implements `Ord` so id sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of step a node represents.
///
/// Closed set: adding a kind means extending this enum and the
/// [`NodeTypeRegistry`](crate::registry::NodeTypeRegistry) match arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Entry point of the process.
    Start,
    /// A regular activity step.
    Process,
    /// A branching point, usually with labelled outgoing edges.
    Decision,
    /// Terminal step.
    End,
}

impl NodeType {
    /// Every node type, in palette order.
    pub const ALL: [NodeType; 4] = [Self::Start, Self::Process, Self::Decision, Self::End];

    /// Parse node type from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "process" => Some(Self::Process),
            "decision" => Some(Self::Decision),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

impl Default for NodeType {
    fn default() -> Self {
        Self::Process
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Process => write!(f, "process"),
            Self::Decision => write!(f, "decision"),
            Self::End => write!(f, "end"),
        }
    }
}

/// Canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Return this position shifted by `delta` on both axes.
    pub fn offset_by(self, delta: Position) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }
}

/// A single step in a process map.
///
/// Selection state is deliberately absent: it lives in
/// [`Selection`](crate::selection::Selection) so history snapshots only
/// ever carry document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Kind of step.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Free-text label shown on the canvas.
    pub label: String,
    /// Canvas position.
    pub position: Position,
    /// Optional color override (CSS color string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_color: Option<String>,
}

impl Node {
    /// Create a new node without a color override.
    pub fn new(id: NodeId, node_type: NodeType, label: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            node_type,
            label: label.into(),
            position,
            custom_color: None,
        }
    }

    /// Set the color override.
    pub fn with_custom_color(mut self, color: impl Into<String>) -> Self {
        self.custom_color = Some(color.into());
        self
    }
}

/// A single field change applied through
/// [`ProcessGraph::update_node`](crate::types::ProcessGraph::update_node).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeUpdate {
    /// Rename the node. Blank labels are rejected.
    Label(String),
    /// Change the node kind.
    Type(NodeType),
    /// Move the node.
    Position(Position),
    /// Set or clear the color override.
    CustomColor(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_round_trips_through_str() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::from_str(&node_type.to_string()), Some(node_type));
        }
        assert_eq!(NodeType::from_str("DECISION"), Some(NodeType::Decision));
        assert_eq!(NodeType::from_str("subprocess"), None);
    }

    #[test]
    fn test_node_serializes_with_type_tag() {
        let node = Node::new(NodeId::new("n1"), NodeType::Decision, "Approved?", Position::new(1.0, 2.0))
            .with_custom_color("#ff0000");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "decision");
        assert_eq!(json["customColor"], "#ff0000");
        assert_eq!(json["id"], "n1");
    }

    #[test]
    fn test_position_offset() {
        let p = Position::new(10.0, 20.0).offset_by(Position::new(50.0, 50.0));
        assert_eq!(p, Position::new(60.0, 70.0));
    }
}
