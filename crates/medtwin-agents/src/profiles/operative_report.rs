//! The operative-report scribe. Collects surgical details through rapid
//! questioning and drafts the report via `surgicalScribeTool`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use medtwin_core::events::ToolSchema;
use medtwin_core::transcript::{
    INAUDIBLE_MARKER, ItemKind, ItemRole, TRANSCRIBING_PLACEHOLDER,
};

use crate::definition::{
    AgentDefinition, AgentRole, ToolCallContext, ToolError, ToolHandler, ToolIntent, ToolOutcome,
};

use super::common::{FORMALITY_AND_PACING, NO_GREETING, TONE};

pub(super) fn agent() -> AgentDefinition {
    let instructions = format!(
        "\
## Personality and Tone
{TONE}
{NO_GREETING}
- Keep responses concise and focused solely on collecting surgical details.
- If the doctor hesitates or stops, prompt again concisely but gently \
(e.g., \"Procedure? Diagnosis?\").
- Do not respond to non-surgical questions.
- Never call surgicalScribeTool prematurely. Only after complete data or if \
the doctor insists.

## Task
- Collect comprehensive patient and surgical information through natural, \
concise conversation.
- Start immediately with: \"please doctor, give me details of the surgery.\"
- Prompt for: patient information (age, gender, diagnosis, history), \
procedure details (name, anesthesia, approach, findings, implants, closure), \
and post-operative information (blood loss, complications, follow-up).
- When sufficient information is gathered, or if the doctor explicitly \
requests the report, call surgicalScribeTool.

## After Calling surgicalScribeTool
- Transfer to surgicalEditor immediately.
- Do not explain that you are transferring.

{FORMALITY_AND_PACING}"
    );

    AgentDefinition::new(
        "operativeReportAssistant",
        AgentRole::General,
        "Collects and documents surgical patient information for operative reports",
        instructions,
    )
    .with_tool(scribe_tool_schema(), Arc::new(SurgicalScribe))
}

fn scribe_tool_schema() -> ToolSchema {
    ToolSchema::function(
        "surgicalScribeTool",
        "Generates a surgical report based on the information provided by the doctor.",
        json!({
            "type": "object",
            "properties": {
                "patientInfo": {
                    "type": "string",
                    "description": "Information about the patient, including age, gender, diagnosis, and medical history."
                },
                "procedureDetails": {
                    "type": "string",
                    "description": "Details about the surgical procedure, including name, anesthesia, approach, findings, and implants."
                },
                "postOpInfo": {
                    "type": "string",
                    "description": "Post-operative information, including blood loss, complications, and follow-up plans."
                }
            },
            "required": []
        }),
    )
}

/// Drafts the operative report. Every section falls back to a
/// "not specified" stub so a forced early call still yields a complete
/// document skeleton.
struct SurgicalScribe;

fn section_or_default(args: &Value, key: &str, default: &str) -> String {
    match args.get(key).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => text.to_owned(),
        _ => default.to_owned(),
    }
}

#[async_trait]
impl ToolHandler for SurgicalScribe {
    async fn handle(&self, args: Value, ctx: &ToolCallContext) -> Result<ToolOutcome, ToolError> {
        let patient_info =
            section_or_default(&args, "patientInfo", "Patient information not specified");
        let procedure_details =
            section_or_default(&args, "procedureDetails", "Procedure details not specified");
        let post_op_info =
            section_or_default(&args, "postOpInfo", "Post-operative information not specified");

        // Everything the doctor dictated this session, as free-form notes.
        let doctor_notes: Vec<&str> = ctx
            .transcript
            .iter()
            .filter(|item| {
                item.role == ItemRole::User
                    && item.kind == ItemKind::Message
                    && !item.is_hidden
                    && item.title != TRANSCRIBING_PLACEHOLDER
                    && item.title != INAUDIBLE_MARKER
            })
            .map(|item| item.title.as_str())
            .collect();

        let additional_notes = if doctor_notes.is_empty() {
            "No additional notes provided.".to_owned()
        } else {
            format!("Based on doctor's notes: {}", doctor_notes.join(" "))
        };

        let report = format!(
            "# OPERATIVE REPORT\n\n\
             ## PATIENT INFORMATION\n{patient_info}\n\n\
             ## PROCEDURE DETAILS\n{procedure_details}\n\n\
             ## POST-OPERATIVE INFORMATION\n{post_op_info}\n\n\
             ## ADDITIONAL NOTES\n{additional_notes}\n"
        );
        debug!(report_len = report.len(), "operative report drafted");

        let payload = json!({
            "report": report,
            "messages": [{
                "role": "assistant",
                "content": "Report generated. Please review and make any necessary edits."
            }]
        });
        Ok(ToolOutcome::payload(payload).with_intent(ToolIntent::ReportDrafted(report)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medtwin_core::transcript::TranscriptLedger;

    fn ctx_with_user_notes(notes: &[&str]) -> ToolCallContext {
        let mut ledger = TranscriptLedger::new();
        for (i, note) in notes.iter().enumerate() {
            ledger.add_message(&format!("item_{i}"), ItemRole::User, note, false);
        }
        ToolCallContext {
            transcript: ledger.items(),
            languages: None,
        }
    }

    #[tokio::test]
    async fn drafts_report_with_all_sections() {
        let ctx = ctx_with_user_notes(&["65-year-old male, severe osteoarthritis"]);
        let outcome = SurgicalScribe
            .handle(
                json!({
                    "patientInfo": "65M, osteoarthritis of the right knee",
                    "procedureDetails": "Total knee arthroplasty, spinal anesthesia",
                    "postOpInfo": "Minimal blood loss, no complications"
                }),
                &ctx,
            )
            .await
            .unwrap();

        let Some(ToolIntent::ReportDrafted(report)) = outcome.intent else {
            panic!("expected ReportDrafted intent");
        };
        assert!(report.starts_with("# OPERATIVE REPORT"));
        assert!(report.contains("Total knee arthroplasty"));
        assert!(report.contains("Based on doctor's notes: 65-year-old male"));
    }

    #[tokio::test]
    async fn missing_sections_fall_back_to_stubs() {
        let ctx = ctx_with_user_notes(&[]);
        let outcome = SurgicalScribe.handle(json!({}), &ctx).await.unwrap();

        let Some(ToolIntent::ReportDrafted(report)) = outcome.intent else {
            panic!("expected ReportDrafted intent");
        };
        assert!(report.contains("Patient information not specified"));
        assert!(report.contains("Procedure details not specified"));
        assert!(report.contains("Post-operative information not specified"));
        assert!(report.contains("No additional notes provided."));
    }

    #[tokio::test]
    async fn placeholder_transcript_items_are_not_notes() {
        let ctx = ctx_with_user_notes(&[TRANSCRIBING_PLACEHOLDER, INAUDIBLE_MARKER]);
        let outcome = SurgicalScribe.handle(json!({}), &ctx).await.unwrap();
        let Some(ToolIntent::ReportDrafted(report)) = outcome.intent else {
            panic!("expected ReportDrafted intent");
        };
        assert!(report.contains("No additional notes provided."));
    }
}
