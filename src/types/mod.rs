//! Core types for the process map.

pub mod node;
pub mod edge;
pub mod graph;

pub use node::{NodeId, NodeType, Position, Node, NodeUpdate};
pub use edge::{EdgeId, Edge};
pub use graph::{ProcessGraph, GraphError, ConnectionRejection, ReplaceReport};
