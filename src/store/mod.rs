//! Persistence seam for process maps.
//!
//! The editor core never talks to a database directly. A document store
//! implements [`GraphStore`]; each call is an atomic request/response that
//! either returns a whole graph or fails without side effects.

pub mod memory;

use async_trait::async_trait;
use crate::types::ProcessGraph;

/// Trait for process-map persistence backends.
///
/// Implementations store whole graphs keyed by map id.
/// All methods are async to support async database access.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the stored graph for a map, or `None` if nothing was saved yet.
    async fn load(&self, map_id: &str) -> Result<Option<ProcessGraph>, Self::Error>;

    /// Persist `graph` as the current content of a map.
    async fn save(&self, map_id: &str, graph: &ProcessGraph) -> Result<(), Self::Error>;
}

pub use memory::{InMemoryGraphStore, InMemoryError};
