//! # medtwin-runtime
//!
//! Orchestration core for the voice-driven hospital assistant: the state
//! machine that tracks which agent is in control of a live speech-to-speech
//! session, executes tool calls, performs hand-offs, and drives the
//! bidirectional translation loop.
//!
//! - **Session state**: [`session`] — connection status plus the active
//!   agent
//! - **Gateway boundary**: [`gateway`] — the realtime transport as a trait
//! - **Config builder**: [`config_builder`] — pure session configuration
//! - **Orchestrator**: [`orchestrator`] — peer event dispatch, tool
//!   execution, hand-offs, translation routing
//! - **Mic gate**: [`mic_gate`] — timer-gated capture muting for the
//!   translation loop
//! - **Lifecycle events**: [`emitter`] — broadcast [`emitter::TwinEvent`]s
//!   for the UI
//! - **Collaborators**: [`mail`] and [`scribe`] HTTP clients
//!
//! ## Crate Position
//!
//! Top of the stack. Depends on medtwin-core and medtwin-agents; the
//! application shell wires a transport into [`gateway::RealtimeGateway`]
//! and feeds peer events to [`orchestrator::Orchestrator::handle_event`].

#![deny(unsafe_code)]

pub mod config_builder;
pub mod emitter;
pub mod errors;
pub mod gateway;
pub mod mail;
pub mod mic_gate;
pub mod orchestrator;
pub mod scribe;
pub mod session;
pub mod testutil;

pub use config_builder::build_session_config;
pub use emitter::{ToolPath, TwinEvent, TwinEventEmitter};
pub use errors::RuntimeError;
pub use gateway::{GatewayError, RealtimeGateway};
pub use mail::{HttpMailSender, MailError, MailMessage, MailSender};
pub use mic_gate::MicGate;
pub use orchestrator::Orchestrator;
pub use scribe::{ScribeClient, ScribeError, ScribeMessage};
pub use session::{SessionState, SessionStatus};
