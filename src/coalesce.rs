//! Commit coalescing for continuous gestures.
//!
//! Dragging a node emits a stream of position updates. Each update is
//! applied to the graph immediately, but the history should only see the
//! final position. The coalescer tracks the open gesture and tells the
//! caller when its pending changes must be flushed into one commit:
//!
//! - the gesture ends explicitly
//! - a different gesture or a discrete operation starts
//! - the idle window elapses with no further updates
//!
//! Time is passed in by the caller, which keeps the policy deterministic
//! under test.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Coalescing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoalesceConfig {
    /// Idle time after the last update before an open gesture is flushed.
    pub idle_window_ms: u64,
}

impl Default for CoalesceConfig {
    fn default() -> Self {
        Self { idle_window_ms: 500 }
    }
}

impl CoalesceConfig {
    /// Idle window as a `Duration`.
    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_ms)
    }
}

/// Identity of a continuous gesture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GestureKey {
    /// Dragging one node.
    MoveNode(NodeId),
}

#[derive(Debug, Clone)]
struct OpenGesture {
    key: GestureKey,
    last_update: Instant,
    updates: usize,
}

/// Tracks the open gesture and decides when to flush it.
#[derive(Debug, Clone)]
pub struct CommitCoalescer {
    config: CoalesceConfig,
    open: Option<OpenGesture>,
}

impl CommitCoalescer {
    /// Create a coalescer with no open gesture.
    pub fn new(config: CoalesceConfig) -> Self {
        Self { config, open: None }
    }

    /// Record an uncommitted update belonging to `key`.
    ///
    /// Returns `true` if a *different* gesture was open and must be
    /// committed before this update is applied.
    pub fn note_update(&mut self, key: GestureKey, now: Instant) -> bool {
        match &mut self.open {
            Some(open) if open.key == key => {
                open.last_update = now;
                open.updates += 1;
                false
            }
            Some(_) => {
                self.open = Some(OpenGesture { key, last_update: now, updates: 1 });
                true
            }
            None => {
                self.open = Some(OpenGesture { key, last_update: now, updates: 1 });
                false
            }
        }
    }

    /// Close the open gesture. Returns whether one was open.
    pub fn finish(&mut self) -> bool {
        match self.open.take() {
            Some(open) => {
                tracing::trace!(gesture = ?open.key, updates = open.updates, "Gesture closed");
                true
            }
            None => false,
        }
    }

    /// Close the open gesture if it has been idle for the configured window.
    /// Returns whether it was closed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let idle = match &self.open {
            Some(open) => now.saturating_duration_since(open.last_update) >= self.config.idle_window(),
            None => false,
        };
        idle && self.finish()
    }

    /// Whether a gesture has uncommitted updates.
    pub fn is_pending(&self) -> bool {
        self.open.is_some()
    }

    /// Key of the open gesture, if any.
    pub fn pending_key(&self) -> Option<&GestureKey> {
        self.open.as_ref().map(|o| &o.key)
    }

    /// Drop the open gesture without reporting it, e.g. after the graph was
    /// replaced wholesale.
    pub fn discard(&mut self) {
        self.open = None;
    }
}
