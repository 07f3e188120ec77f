//! The reserved hand-off tool.
//!
//! Every agent that declares downstream routes gets a `transferAgents` tool
//! whose `destination_agent` parameter enumerates those routes. The list is
//! advisory documentation for the model: the orchestration core tolerates
//! hand-off requests to any registered agent and answers
//! `did_transfer: false` for names it cannot resolve.

use serde_json::json;

use crate::definition::AgentDefinition;
use medtwin_core::events::ToolSchema;

/// Reserved tool name for agent hand-off.
pub const HANDOFF_TOOL: &str = "transferAgents";

/// Build the hand-off tool schema for one agent's downstream routes.
#[must_use]
pub fn handoff_tool_schema(agent: &AgentDefinition) -> ToolSchema {
    let destinations: Vec<serde_json::Value> = agent
        .downstream_agents
        .iter()
        .map(|name| json!(name))
        .collect();

    ToolSchema::function(
        HANDOFF_TOOL,
        format!(
            "Transfers the conversation to a more specialized agent. \
             Available agents for {}: {}.",
            agent.name,
            agent.downstream_agents.join(", ")
        ),
        json!({
            "type": "object",
            "properties": {
                "destination_agent": {
                    "type": "string",
                    "enum": destinations,
                    "description": "The name of the agent to transfer to."
                }
            },
            "required": ["destination_agent"]
        }),
    )
}

/// Inject the hand-off tool into every agent that has downstream routes.
///
/// Agents without routes (the language detector) are left untouched; the
/// translators never pass through here at all since they are factory-built.
#[must_use]
pub fn inject_handoff_tools(agents: Vec<AgentDefinition>) -> Vec<AgentDefinition> {
    agents
        .into_iter()
        .map(|mut agent| {
            if !agent.downstream_agents.is_empty()
                && !agent.tools.iter().any(|t| t.name == HANDOFF_TOOL)
            {
                agent.tools.push(handoff_tool_schema(&agent));
            }
            agent
        })
        .collect()
}
