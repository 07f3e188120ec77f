//! Gateway boundary — the realtime transport as seen by the orchestrator.
//!
//! The orchestrator never talks to a socket. Everything outbound goes
//! through [`RealtimeGateway`]: client events over the data channel, local
//! microphone gating, and teardown. Production wires this to the WebRTC
//! peer connection; tests substitute [`crate::testutil::RecordingGateway`].

use async_trait::async_trait;

use medtwin_core::events::ClientEvent;

/// Transport-boundary failure.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The data channel is not open.
    #[error("data channel closed")]
    ChannelClosed,

    /// Underlying transport failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// The realtime transport collaborator.
///
/// `close` must release the underlying media resources (audio tracks)
/// deterministically; the orchestrator awaits it before resetting session
/// state on disconnect.
#[async_trait]
pub trait RealtimeGateway: Send + Sync {
    /// Send a client event over the data channel.
    async fn send(&self, event: ClientEvent) -> Result<(), GatewayError>;

    /// Mute or unmute local audio capture.
    async fn set_capture_muted(&self, muted: bool) -> Result<(), GatewayError>;

    /// Tear down the transport and release media resources.
    async fn close(&self) -> Result<(), GatewayError>;
}
