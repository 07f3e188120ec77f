//! The translation coordinator. Asks for the doctor's and patient's
//! languages, stores them via `setLanguageContext`, then yields to the
//! language detector.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use medtwin_core::events::ToolSchema;
use medtwin_core::languages::{Language, LanguagesContext};

use crate::definition::{
    AgentDefinition, AgentRole, ToolCallContext, ToolError, ToolHandler, ToolIntent, ToolOutcome,
};

use super::common::{FORMALITY_AND_PACING, NO_GREETING, TONE};

pub(super) fn agent() -> AgentDefinition {
    let instructions = format!(
        "\
## Role and Purpose
{TONE}
{NO_GREETING}
- Start by asking about the doctor's language and the patient's language.
- Remember this data and call the tool setLanguageContext with both languages.
- Then transfer immediately to the languageDetector agent.

## Critical Rules
- Do not provide any greetings or extra commentary.
- Only accept supported languages: {supported}. Prompt the doctor to repeat \
if they submit an unsupported language.
- Immediately call the tool when both languages are known.
- Always yield control to languageDetector after setLanguageContext succeeds.

{FORMALITY_AND_PACING}",
        supported = supported_list(),
    );

    AgentDefinition::new(
        "translationCoordinator",
        AgentRole::General,
        "Agent that coordinates the translation of audio between the doctor and patient",
        instructions,
    )
    .with_tool(set_language_tool_schema(), Arc::new(SetLanguageContext))
}

fn supported_list() -> String {
    Language::ALL
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn language_enum() -> Value {
    Value::Array(Language::ALL.iter().map(|l| json!(l.as_str())).collect())
}

fn set_language_tool_schema() -> ToolSchema {
    ToolSchema::function(
        "setLanguageContext",
        "Sets the global language context by storing the doctor's language and the patient's language.",
        json!({
            "type": "object",
            "properties": {
                "doctorLanguage": {
                    "type": "string",
                    "enum": language_enum(),
                    "description": "The language spoken by the doctor."
                },
                "patientLanguage": {
                    "type": "string",
                    "enum": language_enum(),
                    "description": "The language spoken by the patient."
                }
            },
            "required": ["doctorLanguage", "patientLanguage"]
        }),
    )
}

struct SetLanguageContext;

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments {
            tool: "setLanguageContext".to_owned(),
            message: format!("{key} is required"),
        })
}

#[async_trait]
impl ToolHandler for SetLanguageContext {
    async fn handle(&self, args: Value, _ctx: &ToolCallContext) -> Result<ToolOutcome, ToolError> {
        let doctor_raw = required_str(&args, "doctorLanguage")?;
        let patient_raw = required_str(&args, "patientLanguage")?;

        // An out-of-enum value is a model slip, not a session fault: answer
        // with a corrective payload so the agent re-prompts the doctor.
        let (doctor, patient) =
            match (Language::from_str(doctor_raw), Language::from_str(patient_raw)) {
                (Ok(d), Ok(p)) => (d, p),
                (doctor_parse, _) => {
                    let rejected = if doctor_parse.is_err() {
                        doctor_raw
                    } else {
                        patient_raw
                    };
                    warn!(language = rejected, "unsupported language submitted");
                    let payload = json!({
                        "error": format!("unsupported language: {rejected}"),
                        "supportedLanguages": language_enum(),
                        "messages": [{
                            "role": "assistant",
                            "content": "That language is not supported doctor. Please repeat with a supported language."
                        }]
                    });
                    return Ok(ToolOutcome::payload(payload));
                }
            };

        let payload = json!({
            "messages": [{
                "role": "assistant",
                "content": format!(
                    "Languages set: doctor ({}), patient ({}). Starting parallel processing...",
                    doctor.as_str(),
                    patient.as_str()
                )
            }]
        });
        Ok(ToolOutcome::payload(payload)
            .with_intent(ToolIntent::SetLanguages(LanguagesContext::new(doctor, patient))))
    }
}
