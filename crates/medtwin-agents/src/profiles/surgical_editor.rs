//! The report editor. Appends dictated edits via `updateSurgicalReportTool`
//! and queues delivery via `sendReportEmail`, then routes back to the entry
//! router.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use medtwin_core::events::ToolSchema;

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
- Keep responses concise and focused solely on editing the report.
- Maintain the same fast-paced flow as the previous agent.
- Start with \"anything you like to edit\" every time.
- Always seek explicit confirmation before sending emails.

## Primary Tasks
1. Process voice requests to update the surgical report: call \
updateSurgicalReportTool with every update from the doctor. It may be called \
multiple times. Always prompt the doctor if they are satisfied with the report.
2. When the doctor is satisfied, ask if they want the report sent by email.
3. When email sending is requested or confirmed, call sendReportEmail.
4. IMMEDIATELY transfer control to chiefAssistant after the email trigger, \
without mentioning the transfer.

## Critical Rules
- NEVER explain what you're doing.
- NEVER offer to do anything else.
- ALWAYS start with \"anything you like to edit\".
- ALWAYS ask for email confirmation when edits are complete.

{FORMALITY_AND_PACING}"
    );

    AgentDefinition::new(
        "surgicalEditor",
        AgentRole::General,
        "Handles surgical report updates and edits the report.",
        instructions,
    )
    .with_tool(update_tool_schema(), Arc::new(UpdateReport))
    .with_tool(email_tool_schema(), Arc::new(SendReportEmail))
}

fn update_tool_schema() -> ToolSchema {
    ToolSchema::function(
        "updateSurgicalReportTool",
        "Updates the surgical report with the specified text.",
        json!({
            "type": "object",
            "properties": {
                "updateText": {
                    "type": "string",
                    "description": "The text to update the surgical report with."
                }
            },
            "required": ["updateText"]
        }),
    )
}

fn email_tool_schema() -> ToolSchema {
    ToolSchema::function(
        "sendReportEmail",
        "Sends the current surgical report to the configured recipient by email.",
        json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
    )
}

struct UpdateReport;

#[async_trait]
impl ToolHandler for UpdateReport {
    async fn handle(&self, args: Value, _ctx: &ToolCallContext) -> Result<ToolOutcome, ToolError> {
        let update_text = args
            .get("updateText")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments {
                tool: "updateSurgicalReportTool".to_owned(),
                message: "updateText is required".to_owned(),
            })?;

        let payload = json!({
            "messages": [{
                "role": "assistant",
                "content": format!("Updated: {update_text}. Anything else you'd like to edit?")
            }]
        });
        Ok(ToolOutcome::payload(payload)
            .with_intent(ToolIntent::ReportAppended(update_text.to_owned())))
    }
}

struct SendReportEmail;

#[async_trait]
impl ToolHandler for SendReportEmail {
    async fn handle(&self, _args: Value, _ctx: &ToolCallContext) -> Result<ToolOutcome, ToolError> {
        let payload = json!({
            "messages": [{
                "role": "assistant",
                "content": "Email queued."
            }]
        });
        Ok(ToolOutcome::payload(payload).with_intent(ToolIntent::EmailReport))
    }
}
