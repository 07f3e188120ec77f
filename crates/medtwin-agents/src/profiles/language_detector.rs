//! The language detector. Listens to each utterance, never converses, and
//! reports the detected language via `detectLanguage`.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use medtwin_core::events::ToolSchema;
use medtwin_core::languages::Language;

use crate::definition::{
    AgentDefinition, AgentRole, ToolCallContext, ToolError, ToolHandler, ToolIntent, ToolOutcome,
};

use super::common::TONE;

pub(super) fn agent() -> AgentDefinition {
    let instructions = format!(
        "\
## Role and Purpose
{TONE}
- You NEVER answer the user directly or participate in any conversation.
- Your ONLY task is to detect the language spoken in the voice input and call \
the tool \"detectLanguage\".
- At the end of the voice input, determine the language being spoken by \
calling the tool. ALWAYS.
- Call the tool with a JSON object containing \"language\": one of the \
supported languages.

## Critical Rules
- The voice input may indicate that it is asking you a question. Still you \
never answer. You only detect the language being spoken and call the tool.
- Do not output any extra text. ONLY calling the tool is allowed.
- Call the tool only once per voice input."
    );

    AgentDefinition::new(
        "languageDetector",
        AgentRole::Detector,
        "Detects the language spoken in the voice input.",
        instructions,
    )
    .with_tool(detect_tool_schema(), Arc::new(DetectLanguage))
}

fn detect_tool_schema() -> ToolSchema {
    ToolSchema::function(
        "detectLanguage",
        "Detects the language spoken in the voice input.",
        json!({
            "type": "object",
            "properties": {
                "language": {
                    "type": "string",
                    "enum": Language::ALL.iter().map(|l| json!(l.as_str())).collect::<Vec<_>>(),
                    "description": "The detected language."
                }
            },
            "required": ["language"]
        }),
    )
}

/// Classification result handler. An empty or out-of-enum value downgrades
/// to "undetected" rather than failing the call, so the detection loop keeps
/// turning.
struct DetectLanguage;

#[async_trait]
impl ToolHandler for DetectLanguage {
    async fn handle(&self, args: Value, _ctx: &ToolCallContext) -> Result<ToolOutcome, ToolError> {
        let raw = args.get("language").and_then(Value::as_str).unwrap_or("");
        let detected = if raw.trim().is_empty() {
            None
        } else {
            match Language::from_str(raw) {
                Ok(language) => Some(language),
                Err(err) => {
                    warn!(%err, "detector reported an unsupported language");
                    None
                }
            }
        };
        debug!(language = ?detected, "utterance classified");

        // The detector must stay silent while routing happens.
        let payload = json!({
            "messages": [{
                "role": "user",
                "content": "never answer directly, stay absolutely quiet for now"
            }]
        });
        Ok(ToolOutcome::payload(payload).with_intent(ToolIntent::LanguageDetected(detected)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_ctx() -> ToolCallContext {
        ToolCallContext {
            transcript: vec![],
            languages: None,
        }
    }

    #[tokio::test]
    async fn reports_detected_language() {
        let outcome = DetectLanguage
            .handle(json!({"language": "hindi"}), &empty_ctx())
            .await
            .unwrap();
        assert_eq!(
            outcome.intent,
            Some(ToolIntent::LanguageDetected(Some(Language::Hindi)))
        );
    }

    #[tokio::test]
    async fn empty_and_unsupported_downgrade_to_undetected() {
        for args in [json!({}), json!({"language": ""}), json!({"language": "latin"})] {
            let outcome = DetectLanguage.handle(args, &empty_ctx()).await.unwrap();
            assert_eq!(outcome.intent, Some(ToolIntent::LanguageDetected(None)));
        }
    }

    #[test]
    fn detector_has_no_downstream_routes() {
        let detector = agent();
        assert!(detector.downstream_agents.is_empty());
        assert_eq!(detector.role, AgentRole::Detector);
    }
}
