//! # process-map-kernel
//!
//! Editing core for accreditation process maps: directed graphs of typed
//! steps (start, process, decision, end) that describe how a healthcare
//! organisation runs a compliance procedure.
//!
//! ## Core Contract
//!
//! 1. Every edit goes through [`ProcessGraph`], which keeps ids unique and
//!    never holds a dangling or self-looping edge
//! 2. Every committed state is a snapshot in [`HistoryManager`]; undo and
//!    redo restore snapshots exactly
//! 3. Templates instantiate with fresh ids, so loading one twice yields two
//!    disjoint graphs of the same shape
//!
//! ## Architecture
//!
//! ```text
//! CanvasEvent → ProcessMapEditor → ProcessGraph ──commit──→ HistoryManager
//!                     │                 ↑
//!                     ├── Selection ────┤ (batch ops)
//!                     ├── TemplateLibrary / vertical_stack (replace_all)
//!                     └── GraphStore / SuggestionSource (async seams)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Node and edge order is insertion order and survives every operation
//! - Auto-layout depends only on node order and [`LayoutConfig`]
//! - With a [`SequentialIdProvider`], every operation is reproducible
//! - [`graph_fingerprint`] is stable for identical graph content

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod ids;
pub mod canonical;
pub mod registry;
pub mod history;
pub mod coalesce;
pub mod selection;
pub mod template;
pub mod layout;
pub mod config;
pub mod store;
pub mod suggest;
pub mod editor;

// Re-exports
pub use types::{
    ConnectionRejection, Edge, EdgeId, GraphError, Node, NodeId, NodeType, NodeUpdate,
    Position, ProcessGraph, ReplaceReport,
};
pub use ids::{IdProvider, SequentialIdProvider, UuidIdProvider};
pub use canonical::{canonical_hash, canonical_hash_hex, graph_fingerprint, to_canonical_bytes};
pub use registry::{NodeDescriptor, NodeShape, NodeTypeRegistry};
pub use history::{HistoryConfig, HistoryEntry, HistoryManager};
pub use coalesce::{CoalesceConfig, CommitCoalescer, GestureKey};
pub use selection::{AlignAxis, DeleteSummary, Selection};
pub use template::{
    instantiate, Instantiation, Template, TemplateEdge, TemplateError, TemplateLibrary,
    TemplateNode,
};
pub use layout::{vertical_stack, LayoutConfig};
pub use config::{ConfigError, EditorConfig, CONFIG_PATH_ENV};
pub use store::{GraphStore, InMemoryError, InMemoryGraphStore};
pub use suggest::{NodeSuggestion, SuggestionRequest, SuggestionSource};
pub use editor::{CanvasEvent, EditorError, EventOutcome, ProcessMapEditor};

/// Schema version of the serialized graph and template formats.
/// Increment on breaking changes to any serialized type.
pub const PROCESS_MAP_SCHEMA_VERSION: &str = "1.0.0";
