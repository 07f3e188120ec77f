//! Runtime error types.

use crate::gateway::GatewayError;

/// Errors that can occur while driving a live session.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Transport-level failure (missing credential, connection drop).
    /// The session reverts to Disconnected and may be retried.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The gateway rejected an outbound event.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Malformed arguments to a tool call. Absorbed at the dispatch point;
    /// surfaces here only when a caller invokes a handler directly.
    #[error("Tool argument error: {tool}: {message}")]
    ToolArgument {
        /// Tool name.
        tool: String,
        /// What was malformed.
        message: String,
    },

    /// Internal / unexpected error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RuntimeError {
    /// Whether the error is recoverable (user can retry the connection).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Gateway(_) | Self::ToolArgument { .. } | Self::Internal(_) => false,
        }
    }

    /// Error category string for event emission.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::Connection(_) => "connection",
            Self::Gateway(_) => "gateway",
            Self::ToolArgument { .. } => "tool_argument",
            Self::Internal(_) => "internal",
        }
    }
}
