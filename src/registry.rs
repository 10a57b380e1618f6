//! Node type registry consumed by the rendering layer.
//!
//! Each [`NodeType`] maps to a fixed [`NodeDescriptor`]. The lookup is an
//! exhaustive match, so adding a node type fails to compile until it has a
//! descriptor. Descriptors are presentation data; the graph model never
//! consults them.

use serde::Serialize;

use crate::types::{Node, NodeType};

/// Shape family the canvas should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    /// Rounded capsule, for terminals.
    Pill,
    /// Plain rectangle.
    Rectangle,
    /// Diamond, for branching points.
    Diamond,
}

/// Display and rendering hints for one node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    /// Node type this descriptor belongs to.
    pub node_type: NodeType,
    /// Human-readable name for palettes and tooltips.
    pub display_label: &'static str,
    /// Shape family.
    pub shape: NodeShape,
    /// Default fill color, used unless the node overrides it.
    pub color: &'static str,
    /// Whether the canvas should draw an incoming connection handle.
    ///
    /// Rendering hint only; [`ProcessGraph::connect`](crate::types::ProcessGraph::connect)
    /// does not check it.
    pub accepts_incoming: bool,
    /// Whether the canvas should draw an outgoing connection handle.
    /// Rendering hint only, like `accepts_incoming`.
    pub accepts_outgoing: bool,
}

static START: NodeDescriptor = NodeDescriptor {
    node_type: NodeType::Start,
    display_label: "Start",
    shape: NodeShape::Pill,
    color: "#22c55e",
    accepts_incoming: false,
    accepts_outgoing: true,
};

static PROCESS: NodeDescriptor = NodeDescriptor {
    node_type: NodeType::Process,
    display_label: "Process Step",
    shape: NodeShape::Rectangle,
    color: "#3b82f6",
    accepts_incoming: true,
    accepts_outgoing: true,
};

static DECISION: NodeDescriptor = NodeDescriptor {
    node_type: NodeType::Decision,
    display_label: "Decision",
    shape: NodeShape::Diamond,
    color: "#f59e0b",
    accepts_incoming: true,
    accepts_outgoing: true,
};

static END: NodeDescriptor = NodeDescriptor {
    node_type: NodeType::End,
    display_label: "End",
    shape: NodeShape::Pill,
    color: "#ef4444",
    accepts_incoming: true,
    accepts_outgoing: false,
};

/// Fixed `NodeType -> NodeDescriptor` lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeTypeRegistry;

impl NodeTypeRegistry {
    /// Descriptor for a node type.
    pub fn descriptor(node_type: NodeType) -> &'static NodeDescriptor {
        match node_type {
            NodeType::Start => &START,
            NodeType::Process => &PROCESS,
            NodeType::Decision => &DECISION,
            NodeType::End => &END,
        }
    }

    /// Every descriptor, in palette order.
    pub fn all() -> impl Iterator<Item = &'static NodeDescriptor> {
        NodeType::ALL.into_iter().map(Self::descriptor)
    }

    /// Fill color for a node: its override if set, else the type default.
    pub fn resolve_color(node: &Node) -> &str {
        node.custom_color
            .as_deref()
            .unwrap_or(Self::descriptor(node.node_type).color)
    }
}
