//! Broadcast-based lifecycle event emitter.
//!
//! The UI layer subscribes to [`TwinEvent`]s instead of polling session
//! state. Non-blocking: `emit` never awaits; slow receivers lag and drop
//! rather than blocking the orchestrator.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;

use medtwin_core::languages::Language;

use crate::session::SessionStatus;

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 1024;

/// Which resolution path a tool call took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPath {
    /// Matched a handler on the active agent.
    Handler,
    /// The reserved hand-off tool.
    Handoff,
    /// Unknown tool answered with the generic affirmative result.
    Fallback,
}

/// Lifecycle events broadcast to subscribers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TwinEvent {
    /// Connection status changed.
    StatusChanged {
        /// New status.
        status: SessionStatus,
    },

    /// Control transferred between agents (or a transfer was refused).
    AgentTransferred {
        /// Source agent name.
        from: String,
        /// Requested destination name.
        to: String,
        /// Whether the destination resolved.
        did_transfer: bool,
    },

    /// A tool call was executed.
    ToolExecuted {
        /// Agent that owned the call.
        agent: String,
        /// Tool name.
        tool: String,
        /// Resolution path taken.
        path: ToolPath,
    },

    /// The detection loop classified an utterance and routed it.
    LanguageRouted {
        /// Detected language, `None` when undetected.
        detected: Option<Language>,
        /// Translator activated, `None` when detection stayed in place.
        destination: Option<String>,
    },

    /// Local audio capture was muted or unmuted.
    MicGateChanged {
        /// New gate state.
        muted: bool,
    },

    /// The operative report was drafted or amended.
    ReportUpdated {
        /// Current report length in characters.
        chars: usize,
    },
}

/// Broadcast-based event emitter.
pub struct TwinEventEmitter {
    tx: broadcast::Sender<TwinEvent>,
    emit_count: AtomicU64,
}

impl TwinEventEmitter {
    /// Create a new emitter with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new emitter with a custom channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            emit_count: AtomicU64::new(0),
        }
    }

    /// Emit an event to all subscribers. Non-blocking.
    ///
    /// Returns the number of receivers that saw the event; 0 with no
    /// active subscribers.
    pub fn emit(&self, event: TwinEvent) -> usize {
        let _ = self.emit_count.fetch_add(1, Ordering::Relaxed);
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TwinEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Total number of events emitted.
    #[must_use]
    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }
}

impl Default for TwinEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
