//! Microphone gate for the translation loop.
//!
//! While a directional translator is active, local capture is muted the
//! moment the user stops speaking so the system's own translated audio is
//! not re-captured as new input. Unmuting is deferred until the translated
//! reply has finished playing out, with a delay scaled to the reply length.
//!
//! Scheduled unmutes race against the next `speech_started` and against
//! disconnect. A generation counter resolves the race: every mute, cancel,
//! or newly scheduled unmute bumps the generation, and a sleeping unmute
//! task only fires if its generation is still current.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use medtwin_core::settings::MicGateSettings;

use crate::emitter::{TwinEvent, TwinEventEmitter};
use crate::gateway::RealtimeGateway;

/// Timer-gated control of local audio capture.
pub struct MicGate {
    gateway: Arc<dyn RealtimeGateway>,
    emitter: Arc<TwinEventEmitter>,
    settings: MicGateSettings,
    generation: AtomicU64,
}

impl MicGate {
    /// Create a gate over the given transport.
    pub fn new(
        gateway: Arc<dyn RealtimeGateway>,
        emitter: Arc<TwinEventEmitter>,
        settings: MicGateSettings,
    ) -> Self {
        Self {
            gateway,
            emitter,
            settings,
            generation: AtomicU64::new(0),
        }
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Unmute delay for a reply of the given length: a fixed floor,
    /// extended per character so longer playback is not truncated.
    #[must_use]
    pub fn unmute_delay(&self, reply_chars: usize) -> Duration {
        let scaled = (reply_chars as u64).saturating_mul(self.settings.unmute_delay_per_char_ms);
        Duration::from_millis(scaled.max(self.settings.min_unmute_delay_ms))
    }

    /// Mute capture immediately, invalidating any pending unmute.
    pub async fn mute_now(&self) {
        let generation = self.bump();
        debug!(generation, "mic gate muted");
        if let Err(err) = self.gateway.set_capture_muted(true).await {
            warn!(%err, "failed to mute capture");
            return;
        }
        let _ = self.emitter.emit(TwinEvent::MicGateChanged { muted: true });
    }

    /// Schedule an unmute after `delay`. Any later [`Self::mute_now`],
    /// [`Self::cancel_pending`], or newer schedule supersedes it.
    pub fn schedule_unmute(self: &Arc<Self>, delay: Duration) {
        let generation = self.bump();
        // Deadline is anchored here, not at the task's first poll, so the
        // delay counts from reply completion.
        let deadline = Instant::now() + delay;
        debug!(generation, delay_ms = delay.as_millis() as u64, "unmute scheduled");
        let gate = Arc::clone(self);
        drop(tokio::spawn(async move {
            sleep_until(deadline).await;
            if gate.generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "stale unmute superseded");
                return;
            }
            if let Err(err) = gate.gateway.set_capture_muted(false).await {
                warn!(%err, "failed to unmute capture");
                return;
            }
            let _ = gate.emitter.emit(TwinEvent::MicGateChanged { muted: false });
        }));
    }

    /// Invalidate any pending unmute without touching the gate.
    pub fn cancel_pending(&self) {
        let generation = self.bump();
        debug!(generation, "pending mic transitions cancelled");
    }
}
