//! Test support: an in-memory gateway that records everything sent to it.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use medtwin_core::events::ClientEvent;

use crate::gateway::{GatewayError, RealtimeGateway};

/// A [`RealtimeGateway`] that records outbound traffic instead of sending it.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<ClientEvent>>,
    mute_transitions: Mutex<Vec<bool>>,
    closed: AtomicBool,
    channel_down: AtomicBool,
}

impl RecordingGateway {
    /// Fresh gateway with an open channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    #[must_use]
    pub fn sent_events(&self) -> Vec<ClientEvent> {
        self.sent.lock().clone()
    }

    /// Wire type strings of everything sent so far, in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&'static str> {
        self.sent.lock().iter().map(ClientEvent::event_type).collect()
    }

    /// Drop the recorded events, keeping everything else.
    pub fn clear_sent(&self) {
        self.sent.lock().clear();
    }

    /// Mute state transitions observed so far, in order.
    #[must_use]
    pub fn mute_transitions(&self) -> Vec<bool> {
        self.mute_transitions.lock().clone()
    }

    /// Whether `close` was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Simulate the data channel dropping: subsequent sends fail.
    pub fn set_channel_down(&self, down: bool) {
        self.channel_down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl RealtimeGateway for RecordingGateway {
    async fn send(&self, event: ClientEvent) -> Result<(), GatewayError> {
        if self.channel_down.load(Ordering::SeqCst) {
            return Err(GatewayError::ChannelClosed);
        }
        self.sent.lock().push(event);
        Ok(())
    }

    async fn set_capture_muted(&self, muted: bool) -> Result<(), GatewayError> {
        self.mute_transitions.lock().push(muted);
        Ok(())
    }

    async fn close(&self) -> Result<(), GatewayError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
