//! # medtwin-agents
//!
//! Agent definitions and the static registry for the medtwin assistant.
//!
//! - **Definitions**: [`definition::AgentDefinition`] — name, role,
//!   instructions, tool schemas, tool handlers, downstream routes
//! - **Registry**: [`registry::AgentRegistry`] — validated at build time
//!   (every downstream reference must resolve; cycles are a legal topology)
//! - **Hand-off injection**: [`handoff`] — the reserved `transferAgents` tool
//!   added to every agent that declares downstream routes
//! - **Profiles**: [`profiles`] — the five static behavior profiles plus the
//!   two directional-translator factories
//!
//! ## Crate Position
//!
//! Domain layer. Depends on medtwin-core; depended on by medtwin-runtime.

#![deny(unsafe_code)]

pub mod definition;
pub mod handoff;
pub mod profiles;
pub mod registry;

pub use definition::{
    AgentDefinition, AgentRole, ToolCallContext, ToolError, ToolHandler, ToolIntent, ToolOutcome,
};
pub use handoff::{HANDOFF_TOOL, inject_handoff_tools};
pub use registry::{AgentRegistry, ConfigError};
