//! Translation detection loop — routing and the cyclic return.
//!
//! A detection outcome either activates one of the two directional
//! translators or stays on the detector with a corrective hidden turn.
//! When a translator's audio reply finishes, control returns to the
//! detector for the next utterance; each leg of the detector ⇄ translator
//! cycle is separated by a real peer event, so there is no synchronous
//! recursion.

use tracing::{debug, warn};

use medtwin_agents::profiles::{DOCTOR_TO_PATIENT, PATIENT_TO_DOCTOR};
use medtwin_core::languages::Language;

use crate::emitter::TwinEvent;
use crate::errors::RuntimeError;

use super::Orchestrator;

/// Registry name of the language detector.
const DETECTOR: &str = "languageDetector";

impl Orchestrator {
    /// Route a detection outcome per the stored doctor/patient pair.
    pub(crate) async fn route_detection(
        &self,
        detected: Option<Language>,
    ) -> Result<(), RuntimeError> {
        let Some(languages) = self.state.lock().languages.clone() else {
            // The coordinator has not stored a pair yet; nothing to route
            // against. Stay put and ask again.
            warn!("detection arrived before the language context was set");
            self.send_simulated_user_message(
                "The languages for this conversation are not set yet. Briefly ask \
                 for the doctor's and the patient's languages.",
            )
            .await?;
            return Ok(());
        };

        let destination = match detected {
            Some(lang) if lang == languages.doctor => Some(DOCTOR_TO_PATIENT),
            Some(lang) if lang == languages.patient => Some(PATIENT_TO_DOCTOR),
            _ => None,
        };
        let _ = self.emitter.emit(TwinEvent::LanguageRouted {
            detected,
            destination: destination.map(str::to_owned),
        });

        match (detected, destination) {
            (_, Some(translator)) => {
                debug!(translator, "utterance routed");
                let _ = self.hand_off(translator).await?;
            }
            (Some(lang), None) => {
                // A real language, but neither party's: stay in detection
                // and have the agent steer the speaker back.
                self.ledger.lock().add_breadcrumb(
                    "unsupported utterance language",
                    Some(serde_json::json!({ "detected": lang })),
                );
                self.send_simulated_user_message(&format!(
                    "The last utterance was in {lang}, which is not part of this \
                     conversation. Briefly ask the speaker to repeat in {} or {}.",
                    languages.doctor, languages.patient
                ))
                .await?;
            }
            (None, None) => {
                self.send_simulated_user_message(
                    "The language could not be identified. Briefly ask the speaker \
                     to please repeat.",
                )
                .await?;
            }
        }
        Ok(())
    }

    /// A translator's audio reply finished: schedule the mic unmute scaled
    /// to the reply length, then return control to the detector.
    pub(crate) async fn finish_translation_turn(&self) -> Result<(), RuntimeError> {
        let reply_chars = self.last_reply_chars();
        let delay = self.mic_gate.unmute_delay(reply_chars);
        debug!(reply_chars, delay_ms = delay.as_millis() as u64, "translation turn finished");
        self.mic_gate.schedule_unmute(delay);

        // Cyclic return: no synthetic turn, no buffer clear beyond the
        // standard rebuild — the detector reacts to the next real utterance.
        let Some(detector) = self.registry.lookup(DETECTOR).cloned() else {
            warn!("language detector missing from the registry");
            return Ok(());
        };
        let from = self.active_agent_name();
        self.activate(detector, false).await?;
        let _ = self.emitter.emit(TwinEvent::AgentTransferred {
            from,
            to: DETECTOR.to_owned(),
            did_transfer: true,
        });
        Ok(())
    }
}
