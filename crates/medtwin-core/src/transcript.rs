//! Transcript ledger — append/update log of conversation items.
//!
//! The ledger holds every [`TranscriptItem`] of the live session, keyed by
//! item ID. Items are created on the first event that references an ID,
//! updated by subsequent delta/completion events, and never deleted — only a
//! session reset clears the log. Two invariants hold for the whole session:
//!
//! - item IDs are unique (re-delivery of a known ID is a no-op)
//! - status is monotonic: once `Done`, an item never reverts to `InProgress`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Placeholder shown for a user turn whose transcription has not arrived yet.
pub const TRANSCRIBING_PLACEHOLDER: &str = "[Transcribing...]";

/// Marker stored when a completed transcript is empty or whitespace-only.
pub const INAUDIBLE_MARKER: &str = "[inaudible]";

/// Speaker role of a transcript item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemRole {
    /// The human caller.
    User,
    /// The active agent.
    Assistant,
}

/// Kind of transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    /// A spoken or typed conversation message.
    Message,
    /// A non-conversational observability annotation.
    Breadcrumb,
}

/// Completion status of a transcript item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Still streaming or awaiting transcription.
    InProgress,
    /// Finalized; will not change again.
    Done,
}

/// One entry of the session transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    /// Unique item ID (peer-supplied or locally generated).
    pub item_id: String,
    /// Speaker role.
    pub role: ItemRole,
    /// Message or breadcrumb.
    pub kind: ItemKind,
    /// Display text; streamed incrementally for assistant messages.
    pub title: String,
    /// Structured payload attached to breadcrumbs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Completion status.
    pub status: ItemStatus,
    /// Creation time, Unix milliseconds.
    pub created_at_ms: i64,
    /// Hidden items are synthetic turns not shown in the UI.
    pub is_hidden: bool,
}

/// Append/update log of conversation items, keyed by item ID.
#[derive(Debug, Default)]
pub struct TranscriptLedger {
    items: Vec<TranscriptItem>,
    breadcrumb_seq: u64,
}

impl TranscriptLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message item. Idempotent: a known `item_id` is a no-op.
    ///
    /// An empty `text` for a user message stores the transcription
    /// placeholder until the real transcript arrives.
    pub fn add_message(&mut self, item_id: &str, role: ItemRole, text: &str, is_hidden: bool) {
        if self.contains(item_id) {
            debug!(item_id, "duplicate conversation item ignored");
            return;
        }
        let title = if role == ItemRole::User && text.is_empty() {
            TRANSCRIBING_PLACEHOLDER.to_owned()
        } else {
            text.to_owned()
        };
        self.items.push(TranscriptItem {
            item_id: item_id.to_owned(),
            role,
            kind: ItemKind::Message,
            title,
            data: None,
            status: ItemStatus::InProgress,
            created_at_ms: now_ms(),
            is_hidden,
        });
    }

    /// Add a breadcrumb annotation with an optional structured payload.
    pub fn add_breadcrumb(&mut self, title: &str, data: Option<Value>) {
        self.breadcrumb_seq += 1;
        let item_id = format!("breadcrumb-{}-{}", now_ms(), self.breadcrumb_seq);
        self.items.push(TranscriptItem {
            item_id,
            role: ItemRole::Assistant,
            kind: ItemKind::Breadcrumb,
            title: title.to_owned(),
            data,
            status: ItemStatus::Done,
            created_at_ms: now_ms(),
            is_hidden: false,
        });
    }

    /// Replace the text of an item. Unknown IDs are ignored.
    pub fn set_message_text(&mut self, item_id: &str, text: &str) {
        if let Some(item) = self.get_mut(item_id) {
            item.title = text.to_owned();
        }
    }

    /// Append incremental text to an item. Unknown IDs are ignored.
    pub fn append_message_text(&mut self, item_id: &str, delta: &str) {
        if let Some(item) = self.get_mut(item_id) {
            item.title.push_str(delta);
        }
    }

    /// Mark an item `Done`. Monotonic and idempotent.
    pub fn complete(&mut self, item_id: &str) {
        if let Some(item) = self.get_mut(item_id) {
            item.status = ItemStatus::Done;
        }
    }

    /// Normalize and store a completed user transcript: empty or
    /// whitespace-only text becomes the [`INAUDIBLE_MARKER`].
    pub fn complete_user_transcript(&mut self, item_id: &str, transcript: Option<&str>) {
        let text = match transcript {
            Some(t) if !t.trim().is_empty() => t.to_owned(),
            _ => INAUDIBLE_MARKER.to_owned(),
        };
        self.set_message_text(item_id, &text);
        self.complete(item_id);
    }

    /// Whether an item with this ID exists.
    #[must_use]
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|item| item.item_id == item_id)
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn get(&self, item_id: &str) -> Option<&TranscriptItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    /// Snapshot of all items, in creation order.
    #[must_use]
    pub fn items(&self) -> Vec<TranscriptItem> {
        self.items.clone()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clear everything. Only called on session reset.
    pub fn clear(&mut self) {
        self.items.clear();
        self.breadcrumb_seq = 0;
    }

    fn get_mut(&mut self, item_id: &str) -> Option<&mut TranscriptItem> {
        self.items.iter_mut().find(|item| item.item_id == item_id)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
