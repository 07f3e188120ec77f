//! Wire events for the realtime peer protocol.
//!
//! Two event families:
//!
//! - **[`ServerEvent`]**: Inbound events delivered by the realtime peer over
//!   the data channel (session establishment, conversation items, transcript
//!   deltas, response completion, speech boundaries).
//! - **[`ClientEvent`]**: Outbound events the orchestrator sends back
//!   (session configuration, audio buffer control, response triggers,
//!   conversation item creation for both simulated turns and tool outputs).
//!
//! Both sides are `#[serde(tag = "type")]` with the exact wire strings the
//! peer uses. Unmodeled inbound event types deserialize to
//! [`ServerEvent::Unknown`] and are ignored, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transcript::ItemRole;

// ─────────────────────────────────────────────────────────────────────────────
// ServerEvent — inbound peer events
// ─────────────────────────────────────────────────────────────────────────────

/// Events delivered by the realtime peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// The peer accepted the connection and created a session.
    #[serde(rename = "session.created")]
    SessionCreated {
        /// Session identity block.
        session: SessionInfo,
    },

    /// A conversation item (user or assistant) was created.
    #[serde(rename = "conversation.item.created")]
    ConversationItemCreated {
        /// The created item.
        item: ConversationItem,
    },

    /// Transcription of a user audio turn completed.
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    InputTranscriptionCompleted {
        /// Item the transcript belongs to.
        item_id: String,
        /// Final transcript text. May be empty or whitespace-only.
        #[serde(default)]
        transcript: Option<String>,
    },

    /// Incremental assistant audio transcript text.
    #[serde(rename = "response.audio_transcript.delta")]
    OutputTranscriptDelta {
        /// Item the delta belongs to.
        item_id: String,
        /// Text fragment to append.
        #[serde(default)]
        delta: Option<String>,
    },

    /// A full response finished; carries function-call output items.
    #[serde(rename = "response.done")]
    ResponseDone {
        /// Response body.
        response: ResponseBody,
    },

    /// One output item of a response is done.
    #[serde(rename = "response.output_item.done")]
    OutputItemDone {
        /// Reference to the finished item.
        item: ItemRef,
    },

    /// The user started speaking (server-side VAD).
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted,

    /// The user stopped speaking (server-side VAD).
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped,

    /// The assistant's audio output for a response finished playing out.
    #[serde(rename = "response.audio.done")]
    ResponseAudioDone {
        /// Item the audio belonged to, when the peer includes it.
        #[serde(default)]
        item_id: Option<String>,
    },

    /// Any peer event type this client does not model.
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Wire type string, for logging.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionCreated { .. } => "session.created",
            Self::ConversationItemCreated { .. } => "conversation.item.created",
            Self::InputTranscriptionCompleted { .. } => {
                "conversation.item.input_audio_transcription.completed"
            }
            Self::OutputTranscriptDelta { .. } => "response.audio_transcript.delta",
            Self::ResponseDone { .. } => "response.done",
            Self::OutputItemDone { .. } => "response.output_item.done",
            Self::SpeechStarted => "input_audio_buffer.speech_started",
            Self::SpeechStopped => "input_audio_buffer.speech_stopped",
            Self::ResponseAudioDone { .. } => "response.audio.done",
            Self::Unknown => "unknown",
        }
    }
}

/// Session identity block of a `session.created` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Peer-assigned session ID.
    pub id: String,
}

/// A conversation item as delivered by the peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationItem {
    /// Peer-assigned item ID.
    pub id: String,
    /// Speaker role, when present.
    #[serde(default)]
    pub role: Option<ItemRole>,
    /// Content parts (text or transcript fragments).
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

impl ConversationItem {
    /// First available text of the item: `text` over `transcript`, else empty.
    #[must_use]
    pub fn first_text(&self) -> &str {
        self.content
            .first()
            .and_then(|part| part.text.as_deref().or(part.transcript.as_deref()))
            .unwrap_or("")
    }
}

/// One content part of a conversation item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    /// Part type (`input_text`, `input_audio`, ...).
    #[serde(rename = "type", default)]
    pub part_type: Option<String>,
    /// Literal text, for text parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Transcript text, for audio parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// Body of a `response.done` event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Output items produced by the response.
    #[serde(default)]
    pub output: Vec<ResponseOutputItem>,
}

/// One output item of a completed response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseOutputItem {
    /// Item type (`function_call`, `message`, ...).
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    /// Tool name, for function calls.
    #[serde(default)]
    pub name: Option<String>,
    /// Call ID, for function calls.
    #[serde(default)]
    pub call_id: Option<String>,
    /// Stringified JSON arguments, for function calls.
    #[serde(default)]
    pub arguments: Option<String>,
}

impl ResponseOutputItem {
    /// Interpret this item as a pending tool call, if it is a complete one.
    #[must_use]
    pub fn as_tool_call(&self) -> Option<PendingToolCall> {
        if self.item_type.as_deref() != Some("function_call") {
            return None;
        }
        let name = self.name.clone()?;
        let arguments = self.arguments.clone()?;
        Some(PendingToolCall {
            name,
            call_id: self.call_id.clone(),
            arguments,
        })
    }
}

/// A function call awaiting execution, consumed exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingToolCall {
    /// Tool name as declared in the active agent's schema.
    pub name: String,
    /// Peer-assigned call ID, echoed back in the output event.
    pub call_id: Option<String>,
    /// Raw stringified JSON arguments.
    pub arguments: String,
}

/// Reference to an item by ID.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Item ID.
    pub id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// ClientEvent — outbound events
// ─────────────────────────────────────────────────────────────────────────────

/// Events the orchestrator sends to the realtime peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Re-issue session configuration (active agent, turn detection, tools).
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// New session configuration.
        session: SessionConfig,
    },

    /// Discard any audio currently buffered on the peer.
    #[serde(rename = "input_audio_buffer.clear")]
    InputAudioBufferClear,

    /// Commit the buffered audio as a completed user turn (push-to-talk).
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit,

    /// Ask the peer to generate an assistant response.
    #[serde(rename = "response.create")]
    ResponseCreate,

    /// Create a conversation item: a (possibly simulated) user message or a
    /// function-call output.
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate {
        /// Item payload.
        item: OutgoingItem,
    },
}

impl ClientEvent {
    /// Wire type string, for logging.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::InputAudioBufferClear => "input_audio_buffer.clear",
            Self::InputAudioBufferCommit => "input_audio_buffer.commit",
            Self::ResponseCreate => "response.create",
            Self::ConversationItemCreate { .. } => "conversation.item.create",
        }
    }

    /// Build a `conversation.item.create` for a user text message.
    ///
    /// `id` is set for locally generated (simulated) turns so the transcript
    /// ledger and the peer agree on the item identity.
    #[must_use]
    pub fn user_message(id: Option<String>, text: impl Into<String>) -> Self {
        Self::ConversationItemCreate {
            item: OutgoingItem::Message {
                id,
                role: ItemRole::User,
                content: vec![OutgoingContent::input_text(text)],
            },
        }
    }

    /// Build a `conversation.item.create` carrying a function-call output.
    #[must_use]
    pub fn function_call_output(call_id: Option<String>, output: impl Into<String>) -> Self {
        Self::ConversationItemCreate {
            item: OutgoingItem::FunctionCallOutput {
                call_id,
                output: output.into(),
            },
        }
    }
}

/// Item payload of an outbound `conversation.item.create`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutgoingItem {
    /// A user (or simulated user) text message.
    #[serde(rename = "message")]
    Message {
        /// Locally generated item ID, when the client assigns one.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Speaker role.
        role: ItemRole,
        /// Content parts.
        content: Vec<OutgoingContent>,
    },

    /// The result of an executed function call.
    #[serde(rename = "function_call_output")]
    FunctionCallOutput {
        /// Call ID being answered.
        #[serde(skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
        /// Stringified JSON result.
        output: String,
    },
}

/// One content part of an outbound message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutgoingContent {
    /// Part type; always `input_text` for client-created messages.
    #[serde(rename = "type")]
    pub part_type: String,
    /// Message text.
    pub text: String,
}

impl OutgoingContent {
    /// An `input_text` content part.
    #[must_use]
    pub fn input_text(text: impl Into<String>) -> Self {
        Self {
            part_type: "input_text".into(),
            text: text.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session configuration payload
// ─────────────────────────────────────────────────────────────────────────────

/// Session configuration carried by `session.update`.
///
/// `turn_detection: None` serializes as JSON `null` — the peer treats null as
/// "detection disabled", which is how push-to-talk mode is expressed, so the
/// field is never skipped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Active modalities.
    pub modalities: Vec<String>,
    /// System prompt (the active agent's instructions).
    pub instructions: String,
    /// Voice identifier.
    pub voice: String,
    /// Inbound audio codec.
    pub input_audio_format: String,
    /// Outbound audio codec.
    pub output_audio_format: String,
    /// Transcription model directive.
    pub input_audio_transcription: TranscriptionDirective,
    /// Turn detection policy; `null` disables server-side detection.
    pub turn_detection: Option<TurnDetection>,
    /// Tool schemas of the active agent.
    pub tools: Vec<ToolSchema>,
}

/// Transcription model directive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionDirective {
    /// Model name.
    pub model: String,
}

/// Server-side voice-activity turn detection parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnDetection {
    /// Detection type; always `server_vad`.
    #[serde(rename = "type")]
    pub detection_type: String,
    /// Activation threshold.
    pub threshold: f64,
    /// Audio retained before detected speech, in ms.
    pub prefix_padding_ms: u64,
    /// Silence required to end a turn, in ms.
    pub silence_duration_ms: u64,
    /// Whether the peer auto-creates a response at turn end.
    pub create_response: bool,
}

/// A function tool schema as declared to the peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Schema type; always `function`.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Tool name.
    pub name: String,
    /// Human-readable description for the model.
    pub description: String,
    /// JSON-schema parameter object.
    pub parameters: Value,
}

impl ToolSchema {
    /// A `function` tool schema.
    #[must_use]
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            schema_type: "function".into(),
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
