//! The built-in assistant set.
//!
//! Five static profiles form the registry graph:
//!
//! ```text
//! chiefAssistant ──► operativeReportAssistant ──► surgicalEditor ──┐
//!       ▲  └────────► translationCoordinator ──► languageDetector  │
//!       └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The cycle through `surgicalEditor` back to `chiefAssistant` is
//! intentional. The two directional translators are not part of the graph;
//! they are built per session by the factories in [`translators`].

mod chief_assistant;
mod common;
mod language_detector;
mod operative_report;
mod surgical_editor;
mod translation_coordinator;
pub mod translators;

pub use translators::{DOCTOR_TO_PATIENT, PATIENT_TO_DOCTOR, doctor_to_patient, patient_to_doctor};

use crate::definition::AgentDefinition;
use crate::handoff::inject_handoff_tools;
use crate::registry::{AgentRegistry, ConfigError};

/// The static agent definitions, wired and with hand-off tools injected.
///
/// Order matters: the first entry is the session's starting agent.
#[must_use]
pub fn default_agents() -> Vec<AgentDefinition> {
    let chief = chief_assistant::agent()
        .with_downstream(&["operativeReportAssistant", "translationCoordinator"]);
    let scribe = operative_report::agent().with_downstream(&["surgicalEditor"]);
    let editor = surgical_editor::agent().with_downstream(&["chiefAssistant"]);
    let coordinator = translation_coordinator::agent().with_downstream(&["languageDetector"]);
    let detector = language_detector::agent();

    inject_handoff_tools(vec![chief, scribe, editor, coordinator, detector])
}

/// Build the validated registry over [`default_agents`].
pub fn default_registry() -> Result<AgentRegistry, ConfigError> {
    AgentRegistry::register(default_agents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::HANDOFF_TOOL;

    #[test]
    fn default_set_builds_and_starts_on_chief() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.default_agent().name, "chiefAssistant");
    }

    #[test]
    fn routed_agents_carry_the_handoff_tool() {
        let agents = default_agents();
        for agent in &agents {
            let has_handoff = agent.tools.iter().any(|t| t.name == HANDOFF_TOOL);
            assert_eq!(
                has_handoff,
                !agent.downstream_agents.is_empty(),
                "agent {}",
                agent.name
            );
        }
    }

    #[test]
    fn editor_routes_back_to_chief() {
        let registry = default_registry().unwrap();
        let editor = registry.lookup("surgicalEditor").unwrap();
        assert_eq!(editor.downstream_agents, vec!["chiefAssistant".to_owned()]);
    }

    #[test]
    fn every_declared_tool_has_a_handler() {
        for agent in default_agents() {
            for tool in &agent.tools {
                if tool.name == HANDOFF_TOOL {
                    continue; // executed by the orchestration core, not a handler
                }
                assert!(
                    agent.handler(&tool.name).is_some(),
                    "missing handler for {} on {}",
                    tool.name,
                    agent.name
                );
            }
        }
    }
}
