//! Agent definition — the contract every behavior profile satisfies.
//!
//! An [`AgentDefinition`] is produced either by static registration (the
//! profiles in [`crate::profiles`]) or by a factory function parameterized by
//! live session context (the directional translators). Both satisfy the same
//! contract, so the orchestration core treats them uniformly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use medtwin_core::events::ToolSchema;
use medtwin_core::languages::{Language, LanguagesContext};
use medtwin_core::transcript::TranscriptItem;

/// Behavior class of an agent, for the turn-detection and mic-gating
/// special cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentRole {
    /// A conversational assistant (router, scribe, editor, coordinator).
    General,
    /// The language detector: classifies utterances, never converses.
    Detector,
    /// A directional translator fixed to one source/target pair.
    Translator,
}

/// An immutable behavior profile: prompt, tool surface, routing edges.
#[derive(Clone)]
pub struct AgentDefinition {
    /// Unique name; wire-visible in hand-off tool calls.
    pub name: String,
    /// Behavior class.
    pub role: AgentRole,
    /// One-line description shown to routing agents.
    pub public_description: String,
    /// System prompt (opaque text blob).
    pub instructions: String,
    /// Declared tool schemas, in declaration order.
    pub tools: Vec<ToolSchema>,
    /// Executable handlers keyed by tool name.
    pub handlers: HashMap<String, Arc<dyn ToolHandler>>,
    /// Names of agents reachable via hand-off. Advisory at dispatch time;
    /// validated for existence at registry build.
    pub downstream_agents: Vec<String>,
}

impl AgentDefinition {
    /// Create a definition with no tools and no downstream routes.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        role: AgentRole,
        public_description: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            public_description: public_description.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            handlers: HashMap::new(),
            downstream_agents: Vec::new(),
        }
    }

    /// Add a tool schema with its handler.
    #[must_use]
    pub fn with_tool(mut self, schema: ToolSchema, handler: Arc<dyn ToolHandler>) -> Self {
        let _ = self.handlers.insert(schema.name.clone(), handler);
        self.tools.push(schema);
        self
    }

    /// Set the downstream routes.
    #[must_use]
    pub fn with_downstream(mut self, names: &[&str]) -> Self {
        self.downstream_agents = names.iter().map(|n| (*n).to_owned()).collect();
        self
    }

    /// Look up the handler for a tool name.
    #[must_use]
    pub fn handler(&self, tool_name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(tool_name).cloned()
    }

    /// Whether this agent is one of the two directional translators.
    #[must_use]
    pub fn is_translator(&self) -> bool {
        self.role == AgentRole::Translator
    }
}

impl std::fmt::Debug for AgentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentDefinition")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .field("downstream_agents", &self.downstream_agents)
            .finish_non_exhaustive()
    }
}

/// Read-only context passed to every tool handler invocation.
///
/// Handlers never mutate session state directly; they return a
/// [`ToolIntent`] and the orchestration core applies it. This keeps exactly
/// one owner of mutation.
#[derive(Clone, Debug)]
pub struct ToolCallContext {
    /// Snapshot of the transcript at dispatch time.
    pub transcript: Vec<TranscriptItem>,
    /// Current language context, when set.
    pub languages: Option<LanguagesContext>,
}

/// Outcome of a tool handler.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolOutcome {
    /// Payload sent back to the peer as the function-call output.
    pub payload: Value,
    /// State change for the orchestration core to apply, if any.
    pub intent: Option<ToolIntent>,
}

impl ToolOutcome {
    /// An outcome with a payload and no intent.
    #[must_use]
    pub fn payload(payload: Value) -> Self {
        Self {
            payload,
            intent: None,
        }
    }

    /// Attach an intent.
    #[must_use]
    pub fn with_intent(mut self, intent: ToolIntent) -> Self {
        self.intent = Some(intent);
        self
    }
}

/// A state change requested by a tool handler.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolIntent {
    /// Store the doctor/patient language pair and enter the detection loop.
    SetLanguages(LanguagesContext),
    /// An utterance was classified; `None` means undetected.
    LanguageDetected(Option<Language>),
    /// A full operative report was drafted.
    ReportDrafted(String),
    /// An edit was appended to the current report.
    ReportAppended(String),
    /// Send the current report by email.
    EmailReport,
}

/// Error from a tool handler. Absorbed by the tool executor — a failing call
/// answers the peer with an error payload instead of crashing the session.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments did not match the declared parameter schema.
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// What was wrong.
        message: String,
    },

    /// Handler-internal failure.
    #[error("tool {tool} failed: {message}")]
    Failed {
        /// Tool name.
        tool: String,
        /// What went wrong.
        message: String,
    },
}

/// The trait every executable tool handler implements.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool with parsed arguments and a read-only context.
    async fn handle(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolOutcome, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NoopHandler;

    #[async_trait]
    impl ToolHandler for NoopHandler {
        async fn handle(
            &self,
            _args: Value,
            _ctx: &ToolCallContext,
        ) -> Result<ToolOutcome, ToolError> {
            Ok(ToolOutcome::payload(json!({"ok": true})))
        }
    }

    #[test]
    fn with_tool_registers_schema_and_handler() {
        let agent = AgentDefinition::new("a", AgentRole::General, "desc", "prompt").with_tool(
            ToolSchema::function("doThing", "does a thing", json!({"type": "object"})),
            Arc::new(NoopHandler),
        );

        assert_eq!(agent.tools.len(), 1);
        assert!(agent.handler("doThing").is_some());
        assert!(agent.handler("other").is_none());
    }

    #[test]
    fn translator_detection_by_role() {
        let translator =
            AgentDefinition::new("doctorToPatient", AgentRole::Translator, "d", "p");
        let general = AgentDefinition::new("chiefAssistant", AgentRole::General, "d", "p");
        assert!(translator.is_translator());
        assert!(!general.is_translator());
    }

    #[tokio::test]
    async fn outcome_carries_intent() {
        let ctx = ToolCallContext {
            transcript: vec![],
            languages: None,
        };
        let outcome = NoopHandler.handle(json!({}), &ctx).await.unwrap();
        assert_eq!(outcome.intent, None);

        let with_intent = outcome.with_intent(ToolIntent::EmailReport);
        assert_eq!(with_intent.intent, Some(ToolIntent::EmailReport));
    }
}
