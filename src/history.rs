//! Snapshot-based undo/redo log.
//!
//! The log is a vector of owned graph snapshots plus a pointer to the
//! entry matching the live graph. Entries past the pointer are redo
//! entries; any commit after an undo truncates them.
//!
//! ```text
//!   entries:  [G0] [G1] [G2] [G3]
//!                        ^p
//!   undo  -> p = 1, returns G1
//!   redo  -> p = 3, returns G3
//!   commit(G4) at p = 2 -> [G0] [G1] [G2] [G4]
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProcessGraph;

/// History configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum retained entries. `None` keeps every entry for the session.
    ///
    /// When the cap is exceeded the oldest entries are evicted and the
    /// oldest retained entry becomes the new undo floor.
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl HistoryConfig {
    /// Unbounded history.
    pub fn unbounded() -> Self {
        Self { max_entries: None }
    }

    /// History capped at `max_entries` (at least 1).
    pub fn capped(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
        }
    }
}

/// One committed graph state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Owned deep copy of the graph at commit time.
    pub graph: ProcessGraph,
    /// When the entry was committed.
    pub committed_at: DateTime<Utc>,
}

impl HistoryEntry {
    fn capture(graph: &ProcessGraph) -> Self {
        Self {
            graph: graph.clone(),
            committed_at: Utc::now(),
        }
    }
}

/// Linear undo/redo log over [`ProcessGraph`] snapshots.
///
/// Always holds at least one entry: the state the session started from.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    pointer: usize,
    config: HistoryConfig,
}

impl HistoryManager {
    /// Start a log whose entry 0 is `initial`.
    pub fn new(initial: &ProcessGraph) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    /// Start a log with an explicit configuration.
    pub fn with_config(initial: &ProcessGraph, config: HistoryConfig) -> Self {
        Self {
            entries: vec![HistoryEntry::capture(initial)],
            pointer: 0,
            config,
        }
    }

    /// Record `graph` as the newest state.
    ///
    /// Discards any redo entries, appends a deep copy and moves the pointer
    /// to it.
    pub fn commit(&mut self, graph: &ProcessGraph) {
        self.entries.truncate(self.pointer + 1);
        self.entries.push(HistoryEntry::capture(graph));
        self.pointer = self.entries.len() - 1;

        if let Some(max) = self.config.max_entries {
            let max = max.max(1);
            if self.entries.len() > max {
                let evict = self.entries.len() - max;
                self.entries.drain(..evict);
                self.pointer -= evict;
                tracing::trace!(evicted = evict, "History cap reached");
            }
        }
    }

    /// Step back one entry. Returns `None` at the undo floor.
    pub fn undo(&mut self) -> Option<&ProcessGraph> {
        if self.pointer == 0 {
            return None;
        }
        self.pointer -= 1;
        Some(&self.entries[self.pointer].graph)
    }

    /// Step forward one entry. Returns `None` when nothing was undone.
    pub fn redo(&mut self) -> Option<&ProcessGraph> {
        if self.pointer + 1 >= self.entries.len() {
            return None;
        }
        self.pointer += 1;
        Some(&self.entries[self.pointer].graph)
    }

    /// Drop all entries and start over from `graph`.
    ///
    /// Used for hard reset points such as template loads, where undoing
    /// back into the previous, unrelated graph is not allowed.
    pub fn reset(&mut self, graph: &ProcessGraph) {
        self.entries.clear();
        self.entries.push(HistoryEntry::capture(graph));
        self.pointer = 0;
    }

    /// Whether [`undo`](Self::undo) would move.
    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    /// Whether [`redo`](Self::redo) would move.
    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the initial entry is never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry matching the live graph.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Entry at the pointer.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.pointer]
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Active configuration.
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}
