//! Agent registry — the validated static agent graph.
//!
//! Built once at startup from the behavior profiles. Validation checks the
//! graph closure invariant: every name referenced in a `downstream_agents`
//! list must resolve to a registered agent. Cycles are a legal, intended
//! topology (surgicalEditor routes back to chiefAssistant); only dangling
//! references are an error. The registry is never mutated after build —
//! dynamic agent variants (directional translators) come from factory
//! functions and are substituted into the session directly.

use std::collections::HashMap;

use tracing::debug;

use crate::definition::AgentDefinition;
use medtwin_core::events::ToolSchema;

/// Invalid agent graph. Fatal at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Two agents were registered under the same name.
    #[error("duplicate agent name: {0}")]
    DuplicateAgent(String),

    /// A downstream reference does not resolve.
    #[error("agent {agent} routes to unknown agent {destination}")]
    UnknownDownstream {
        /// The agent holding the dangling edge.
        agent: String,
        /// The unresolved destination name.
        destination: String,
    },

    /// No agents were registered.
    #[error("agent registry is empty")]
    Empty,
}

/// Immutable index of the static agents, keyed by name.
#[derive(Debug)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentDefinition>,
    /// First registered agent; the session starts on it.
    default_name: String,
}

impl AgentRegistry {
    /// Build a validated registry from a list of definitions.
    pub fn register(agents: Vec<AgentDefinition>) -> Result<Self, ConfigError> {
        let Some(default_name) = agents.first().map(|a| a.name.clone()) else {
            return Err(ConfigError::Empty);
        };

        let mut index = HashMap::new();
        for agent in agents {
            debug!(agent = %agent.name, "agent registered");
            let name = agent.name.clone();
            if index.insert(name.clone(), agent).is_some() {
                return Err(ConfigError::DuplicateAgent(name));
            }
        }

        // Graph closure: every downstream edge must land on a registered name.
        for agent in index.values() {
            for destination in &agent.downstream_agents {
                if !index.contains_key(destination) {
                    return Err(ConfigError::UnknownDownstream {
                        agent: agent.name.clone(),
                        destination: destination.clone(),
                    });
                }
            }
        }

        Ok(Self {
            agents: index,
            default_name,
        })
    }

    /// Look up an agent by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.get(name)
    }

    /// Tool schemas of a registered agent.
    #[must_use]
    pub fn list_tools(&self, name: &str) -> Option<&[ToolSchema]> {
        self.lookup(name).map(|a| a.tools.as_slice())
    }

    /// Registered names, sorted alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// The agent the session starts on (first registered).
    #[must_use]
    pub fn default_agent(&self) -> &AgentDefinition {
        &self.agents[&self.default_name]
    }

    /// Number of registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty (it never is after a successful build).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AgentRole;
    use assert_matches::assert_matches;

    fn agent(name: &str, downstream: &[&str]) -> AgentDefinition {
        AgentDefinition::new(name, AgentRole::General, "test", "prompt").with_downstream(downstream)
    }

    #[test]
    fn valid_graph_builds() {
        let registry = AgentRegistry::register(vec![
            agent("router", &["scribe"]),
            agent("scribe", &["router"]),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.default_agent().name, "router");
    }

    #[test]
    fn cycles_are_legal() {
        // detector ⇄ coordinator mirrors the translation loop topology.
        let registry = AgentRegistry::register(vec![
            agent("coordinator", &["detector"]),
            agent("detector", &["coordinator"]),
        ]);
        assert!(registry.is_ok());
    }

    #[test]
    fn self_edge_is_legal() {
        assert!(AgentRegistry::register(vec![agent("loop", &["loop"])]).is_ok());
    }

    #[test]
    fn dangling_downstream_fails() {
        let err = AgentRegistry::register(vec![agent("router", &["ghost"])]).unwrap_err();
        assert_matches!(
            err,
            ConfigError::UnknownDownstream { agent, destination }
                if agent == "router" && destination == "ghost"
        );
    }

    #[test]
    fn empty_registry_fails() {
        assert_eq!(AgentRegistry::register(vec![]).unwrap_err(), ConfigError::Empty);
    }

    #[test]
    fn duplicate_name_fails() {
        let err =
            AgentRegistry::register(vec![agent("router", &[]), agent("router", &[])]).unwrap_err();
        assert_matches!(err, ConfigError::DuplicateAgent(_));
    }

    #[test]
    fn registry_formats_for_diagnostics() {
        // unwrap_err on register() needs the Ok side to be Debug too.
        let registry = AgentRegistry::register(vec![agent("router", &[])]).unwrap();
        assert!(format!("{registry:?}").contains("router"));
    }

    #[test]
    fn lookup_and_list_tools() {
        let registry = AgentRegistry::register(vec![agent("router", &[])]).unwrap();
        assert!(registry.lookup("router").is_some());
        assert!(registry.lookup("ghost").is_none());
        assert_eq!(registry.list_tools("router").unwrap().len(), 0);
        assert!(registry.list_tools("ghost").is_none());
    }

    #[test]
    fn default_set_closure_holds() {
        // The shipping agent set must satisfy the closure invariant.
        let registry = crate::profiles::default_registry().unwrap();
        for name in registry.names() {
            let agent = registry.lookup(&name).unwrap();
            for downstream in &agent.downstream_agents {
                assert!(
                    registry.lookup(downstream).is_some(),
                    "{name} routes to unknown {downstream}"
                );
            }
        }
    }
}
