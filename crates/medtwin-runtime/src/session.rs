//! Session state — connection status plus the orthogonal "which agent is
//! in control" sub-state.

use serde::Serialize;

use medtwin_agents::AgentDefinition;
use medtwin_core::languages::LanguagesContext;

/// Connection lifecycle of the single live session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// No transport. The resting and terminal state.
    Disconnected,
    /// Transport requested, peer has not yet confirmed a session.
    Connecting,
    /// Live bidirectional audio session.
    Connected,
}

impl SessionStatus {
    /// Wire/display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
        }
    }
}

/// Mutable state of the session. Owned by the orchestrator behind a lock;
/// every transition is driven by a peer event or an operator command.
pub struct SessionState {
    /// Connection lifecycle.
    pub status: SessionStatus,
    /// The agent currently in control. Always set, even while disconnected.
    pub active_agent: AgentDefinition,
    /// Push-to-talk mode; disables server-side turn detection.
    pub push_to_talk: bool,
    /// Whether the peer's data channel is open for client events.
    pub data_channel_open: bool,
    /// Server-side VAD says the user is currently speaking.
    pub user_speaking: bool,
    /// Doctor/patient language pair, once the coordinator has stored it.
    pub languages: Option<LanguagesContext>,
    /// The operative report as drafted and amended this session.
    pub report: String,
}

impl SessionState {
    /// Fresh disconnected state starting on the given agent.
    #[must_use]
    pub fn new(active_agent: AgentDefinition) -> Self {
        Self {
            status: SessionStatus::Disconnected,
            active_agent,
            push_to_talk: false,
            data_channel_open: false,
            user_speaking: false,
            languages: None,
            report: String::new(),
        }
    }

    /// Reset to disconnected, restoring the given starting agent. The
    /// push-to-talk preference survives the reset; everything session-scoped
    /// is cleared.
    pub fn reset(&mut self, active_agent: AgentDefinition) {
        self.status = SessionStatus::Disconnected;
        self.active_agent = active_agent;
        self.data_channel_open = false;
        self.user_speaking = false;
        self.languages = None;
        self.report.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medtwin_agents::AgentRole;
    use medtwin_core::languages::{Language, LanguagesContext};

    fn agent(name: &str) -> AgentDefinition {
        AgentDefinition::new(name, AgentRole::General, "d", "p")
    }

    #[test]
    fn reset_clears_session_scoped_state_but_keeps_ptt() {
        let mut state = SessionState::new(agent("chief"));
        state.status = SessionStatus::Connected;
        state.push_to_talk = true;
        state.user_speaking = true;
        state.languages = Some(LanguagesContext::new(Language::English, Language::Urdu));
        state.report = "# OPERATIVE REPORT".into();
        state.active_agent = agent("editor");

        state.reset(agent("chief"));

        assert_eq!(state.status, SessionStatus::Disconnected);
        assert_eq!(state.active_agent.name, "chief");
        assert!(state.push_to_talk);
        assert!(!state.user_speaking);
        assert!(state.languages.is_none());
        assert!(state.report.is_empty());
    }
}
