//! Seam for AI-backed suggestion and generation services.
//!
//! The kernel ships no model integration. A service implements
//! [`SuggestionSource`]; its output is applied through the same graph
//! primitives as any other edit (`add_node` for suggestions, `replace_all`
//! for generated maps).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{NodeType, ProcessGraph};

/// A single proposed next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSuggestion {
    /// Proposed node kind.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Proposed label.
    pub label: String,
    /// Why the service proposes this step.
    #[serde(default)]
    pub rationale: String,
}

impl NodeSuggestion {
    /// Create a new suggestion.
    pub fn new(node_type: NodeType, label: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            node_type,
            label: label.into(),
            rationale: rationale.into(),
        }
    }
}

/// Context handed to a suggestion service.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRequest {
    /// Free-text prompt, if the user typed one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// The live graph at request time.
    pub graph: ProcessGraph,
}

/// Trait for suggestion/generation services.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Error type for service calls.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Propose next steps for the current map.
    async fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<NodeSuggestion>, Self::Error>;

    /// Generate a complete replacement map.
    async fn generate(&self, request: &SuggestionRequest) -> Result<ProcessGraph, Self::Error>;
}
