//! Orchestrator — the session state machine.
//!
//! Owns which agent is in control of the live audio session and everything
//! that follows from it:
//!
//! 1. Dispatch of every inbound peer event (transcript bookkeeping, speech
//!    boundaries, response completion)
//! 2. Tool execution against the active agent ([`tool_executor`])
//! 3. Hand-offs between agents, with session reconfiguration on every
//!    transition
//! 4. The translation detection loop and its mic gating ([`translation`])
//!
//! Events are delivered serially by the transport; no two peer events are
//! processed concurrently against the same session. All mutation funnels
//! through this type — tool handlers only return intents.

mod tool_executor;
mod translation;

use std::sync::Arc;

use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use medtwin_agents::registry::AgentRegistry;
use medtwin_agents::{AgentDefinition, profiles};
use medtwin_core::events::{ClientEvent, ServerEvent};
use medtwin_core::settings::RealtimeSettings;
use medtwin_core::transcript::{ItemKind, ItemRole, TranscriptItem, TranscriptLedger};

use crate::config_builder::build_session_config;
use crate::emitter::{TwinEvent, TwinEventEmitter};
use crate::errors::RuntimeError;
use crate::gateway::RealtimeGateway;
use crate::mail::MailSender;
use crate::mic_gate::MicGate;
use crate::session::{SessionState, SessionStatus};

/// Single-session orchestrator.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    gateway: Arc<dyn RealtimeGateway>,
    settings: RealtimeSettings,
    state: Mutex<SessionState>,
    ledger: Mutex<TranscriptLedger>,
    emitter: Arc<TwinEventEmitter>,
    mic_gate: Arc<MicGate>,
    mail: Option<Arc<dyn MailSender>>,
    /// Cancelled on disconnect; replaced on the next connect.
    cancel: Mutex<CancellationToken>,
}

impl Orchestrator {
    /// Create an orchestrator over a validated registry and a transport.
    /// The session starts disconnected, on the registry's default agent.
    #[must_use]
    pub fn new(
        registry: Arc<AgentRegistry>,
        gateway: Arc<dyn RealtimeGateway>,
        settings: RealtimeSettings,
    ) -> Self {
        let emitter = Arc::new(TwinEventEmitter::new());
        let mic_gate = Arc::new(MicGate::new(
            Arc::clone(&gateway),
            Arc::clone(&emitter),
            settings.mic_gate.clone(),
        ));
        let state = SessionState::new(registry.default_agent().clone());
        Self {
            registry,
            gateway,
            settings,
            state: Mutex::new(state),
            ledger: Mutex::new(TranscriptLedger::new()),
            emitter,
            mic_gate,
            mail: None,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Attach the mail collaborator used by the report email flow.
    #[must_use]
    pub fn with_mail_sender(mut self, mail: Arc<dyn MailSender>) -> Self {
        self.mail = Some(mail);
        self
    }

    /// Subscribe to lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TwinEvent> {
        self.emitter.subscribe()
    }

    /// Current connection status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// Name of the agent currently in control.
    #[must_use]
    pub fn active_agent_name(&self) -> String {
        self.state.lock().active_agent.name.clone()
    }

    /// Snapshot of the transcript ledger.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptItem> {
        self.ledger.lock().items()
    }

    /// The operative report as drafted and amended so far.
    #[must_use]
    pub fn report(&self) -> String {
        self.state.lock().report.clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Begin connecting. The transport confirms with `session.created`.
    pub fn connect(&self) {
        let mut state = self.state.lock();
        if state.status != SessionStatus::Disconnected {
            warn!(status = state.status.as_str(), "connect ignored");
            return;
        }
        state.status = SessionStatus::Connecting;
        drop(state);
        *self.cancel.lock() = CancellationToken::new();
        info!("session connecting");
        let _ = self.emitter.emit(TwinEvent::StatusChanged {
            status: SessionStatus::Connecting,
        });
    }

    /// Tear the session down from any state.
    ///
    /// Closes the gateway first so media resources are released
    /// deterministically, then resets state and clears the ledger. Peer
    /// events arriving after this call are ignored.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        self.cancel.lock().cancel();
        self.mic_gate.cancel_pending();
        if let Err(err) = self.gateway.close().await {
            warn!(%err, "gateway close failed");
        }
        self.state.lock().reset(self.registry.default_agent().clone());
        self.ledger.lock().clear();
        info!("session disconnected");
        let _ = self.emitter.emit(TwinEvent::StatusChanged {
            status: SessionStatus::Disconnected,
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Peer event dispatch
    // ─────────────────────────────────────────────────────────────────────

    /// Process one inbound peer event.
    ///
    /// The transport delivers events serially; this is the session's single
    /// logical thread of control.
    #[instrument(skip_all, fields(event = event.event_type()))]
    pub async fn handle_event(&self, event: ServerEvent) -> Result<(), RuntimeError> {
        if self.cancel.lock().is_cancelled() {
            debug!("event ignored after disconnect");
            return Ok(());
        }
        counter!("peer_events_total", "type" => event.event_type()).increment(1);

        match event {
            ServerEvent::SessionCreated { session } => {
                let accepted = {
                    let mut state = self.state.lock();
                    if state.status == SessionStatus::Connecting {
                        state.status = SessionStatus::Connected;
                        state.data_channel_open = true;
                        true
                    } else {
                        false
                    }
                };
                if !accepted {
                    warn!(session_id = %session.id, "session.created without a pending connect");
                    return Ok(());
                }
                self.ledger.lock().add_breadcrumb(
                    &format!(
                        "session.id: {}\nStarted at: {}",
                        session.id,
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                    ),
                    None,
                );
                info!(session_id = %session.id, "session established");
                let _ = self.emitter.emit(TwinEvent::StatusChanged {
                    status: SessionStatus::Connected,
                });
                // Initial configuration for the starting agent, plus the
                // synthetic opening turn so it greets first.
                self.update_session(true).await?;
            }

            ServerEvent::ConversationItemCreated { item } => {
                if let Some(role) = item.role {
                    let text = item.first_text().to_owned();
                    self.ledger.lock().add_message(&item.id, role, &text, false);
                }
            }

            ServerEvent::InputTranscriptionCompleted {
                item_id,
                transcript,
            } => {
                self.ledger
                    .lock()
                    .complete_user_transcript(&item_id, transcript.as_deref());
            }

            ServerEvent::OutputTranscriptDelta { item_id, delta } => {
                self.ledger
                    .lock()
                    .append_message_text(&item_id, delta.as_deref().unwrap_or_default());
            }

            ServerEvent::ResponseDone { response } => {
                // The sole trigger for tool execution and hand-offs; calls
                // in one batch are applied sequentially in arrival order.
                let calls: Vec<_> = response
                    .output
                    .iter()
                    .filter_map(medtwin_core::events::ResponseOutputItem::as_tool_call)
                    .collect();
                for call in calls {
                    self.execute_tool(call).await?;
                }
            }

            ServerEvent::OutputItemDone { item } => {
                self.ledger.lock().complete(&item.id);
            }

            ServerEvent::SpeechStarted => {
                self.state.lock().user_speaking = true;
                // A new utterance supersedes any pending unmute.
                self.mic_gate.cancel_pending();
            }

            ServerEvent::SpeechStopped => {
                let translator_active = {
                    let mut state = self.state.lock();
                    state.user_speaking = false;
                    state.active_agent.is_translator()
                };
                if translator_active {
                    self.mic_gate.mute_now().await;
                }
            }

            ServerEvent::ResponseAudioDone { .. } => {
                if self.state.lock().active_agent.is_translator() {
                    self.finish_translation_turn().await?;
                }
            }

            ServerEvent::Unknown => {
                debug!("unmodeled peer event ignored");
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Push-to-talk
    // ─────────────────────────────────────────────────────────────────────

    /// Toggle push-to-talk mode. When connected, the session is rebuilt and
    /// retransmitted without a synthetic opening turn.
    pub async fn set_push_to_talk(&self, enabled: bool) -> Result<(), RuntimeError> {
        let connected = {
            let mut state = self.state.lock();
            state.push_to_talk = enabled;
            state.status == SessionStatus::Connected
        };
        debug!(enabled, "push-to-talk toggled");
        if connected {
            self.update_session(false).await?;
        }
        Ok(())
    }

    /// Push-to-talk button pressed: discard any buffered audio.
    pub async fn push_to_talk_down(&self) -> Result<(), RuntimeError> {
        if !self.push_to_talk_armed() {
            return Ok(());
        }
        self.gateway.send(ClientEvent::InputAudioBufferClear).await?;
        Ok(())
    }

    /// Push-to-talk button released: commit the captured audio as a user
    /// turn and request a reply.
    pub async fn push_to_talk_up(&self) -> Result<(), RuntimeError> {
        if !self.push_to_talk_armed() {
            return Ok(());
        }
        self.gateway.send(ClientEvent::InputAudioBufferCommit).await?;
        self.gateway.send(ClientEvent::ResponseCreate).await?;
        Ok(())
    }

    fn push_to_talk_armed(&self) -> bool {
        let state = self.state.lock();
        state.status == SessionStatus::Connected && state.push_to_talk && state.data_channel_open
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hand-off
    // ─────────────────────────────────────────────────────────────────────

    /// Transfer control to the named destination.
    ///
    /// The source agent's downstream list is advisory: any registered agent
    /// (or, once languages are set, either directional translator) is a
    /// valid destination. Returns whether the destination resolved; an
    /// unresolved name is data (`did_transfer: false`), not an error.
    #[instrument(skip(self))]
    pub(crate) async fn hand_off(&self, destination: &str) -> Result<bool, RuntimeError> {
        match self.resolve_destination(destination) {
            Some(agent) => {
                self.complete_hand_off(agent, destination).await?;
                Ok(true)
            }
            None => {
                self.refuse_hand_off(destination);
                Ok(false)
            }
        }
    }

    /// Reconfigure the session onto an already-resolved destination.
    pub(crate) async fn complete_hand_off(
        &self,
        agent: AgentDefinition,
        destination: &str,
    ) -> Result<(), RuntimeError> {
        let from = self.active_agent_name();
        {
            let state = self.state.lock();
            if !state
                .active_agent
                .downstream_agents
                .iter()
                .any(|d| d == destination)
            {
                debug!(from, destination, "hand-off outside declared downstream routes");
            }
        }

        info!(from, destination, "agent hand-off");
        counter!("agent_handoffs_total", "destination" => agent.name.clone()).increment(1);
        self.activate(agent, true).await?;
        let _ = self.emitter.emit(TwinEvent::AgentTransferred {
            from,
            to: destination.to_owned(),
            did_transfer: true,
        });
        Ok(())
    }

    /// Record a hand-off request whose destination did not resolve.
    pub(crate) fn refuse_hand_off(&self, destination: &str) {
        let from = self.active_agent_name();
        warn!(from, destination, "hand-off destination not found");
        self.ledger.lock().add_breadcrumb(
            &format!("transfer failed: {destination}"),
            Some(serde_json::json!({ "from": from })),
        );
        let _ = self.emitter.emit(TwinEvent::AgentTransferred {
            from,
            to: destination.to_owned(),
            did_transfer: false,
        });
    }

    /// Resolve a destination name: registry members first, then the two
    /// directional translators built from the stored language pair.
    fn resolve_destination(&self, destination: &str) -> Option<AgentDefinition> {
        if let Some(agent) = self.registry.lookup(destination) {
            return Some(agent.clone());
        }
        let languages = self.state.lock().languages.clone()?;
        match destination {
            profiles::DOCTOR_TO_PATIENT => Some(profiles::doctor_to_patient(&languages)),
            profiles::PATIENT_TO_DOCTOR => Some(profiles::patient_to_doctor(&languages)),
            _ => None,
        }
    }

    /// Install `agent` as active and retransmit the session configuration.
    ///
    /// `trigger_response` requests the synthetic opening turn; it is
    /// suppressed for translator destinations regardless, as is the audio
    /// buffer clear — a translator must react to the next real utterance
    /// and must not discard audio already in flight.
    pub(crate) async fn activate(
        &self,
        agent: AgentDefinition,
        trigger_response: bool,
    ) -> Result<(), RuntimeError> {
        let name = agent.name.clone();
        self.state.lock().active_agent = agent;
        self.ledger
            .lock()
            .add_breadcrumb(&format!("Agent: {name}"), None);
        self.update_session(trigger_response).await
    }

    /// Rebuild and transmit the session configuration for the current
    /// active agent and push-to-talk flag.
    async fn update_session(&self, trigger_response: bool) -> Result<(), RuntimeError> {
        let (config, is_translator) = {
            let state = self.state.lock();
            (
                build_session_config(&state.active_agent, state.push_to_talk, &self.settings),
                state.active_agent.is_translator(),
            )
        };
        if !is_translator {
            self.gateway.send(ClientEvent::InputAudioBufferClear).await?;
        }
        self.gateway
            .send(ClientEvent::SessionUpdate { session: config })
            .await?;
        if trigger_response && !is_translator {
            self.send_simulated_user_message("hello assistant").await?;
        }
        Ok(())
    }

    /// Inject a hidden synthetic user turn and request a reply.
    pub(crate) async fn send_simulated_user_message(
        &self,
        text: &str,
    ) -> Result<(), RuntimeError> {
        let id = Uuid::new_v4().simple().to_string();
        self.ledger
            .lock()
            .add_message(&id, ItemRole::User, text, true);
        self.gateway
            .send(ClientEvent::user_message(Some(id), text))
            .await?;
        self.gateway.send(ClientEvent::ResponseCreate).await?;
        Ok(())
    }

    /// Character count of the most recent assistant reply, for the mic
    /// gate's playback-length scaling.
    pub(crate) fn last_reply_chars(&self) -> usize {
        self.ledger
            .lock()
            .items()
            .iter()
            .rev()
            .find(|item| item.role == ItemRole::Assistant && item.kind == ItemKind::Message)
            .map_or(0, |item| item.title.chars().count())
    }
}
