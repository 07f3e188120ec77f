//! Realtime session settings.
//!
//! Compiled defaults with an optional JSON overlay. All types use
//! `#[serde(rename_all = "camelCase", default)]` so a partial settings file
//! only overrides the fields it names; everything else keeps its production
//! default value.

use serde::{Deserialize, Serialize};

/// Root settings for the medtwin realtime session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeSettings {
    /// Voice identifier sent in every session configuration.
    pub voice: String,
    /// Transcription model directive.
    pub transcription_model: String,
    /// Server-side voice-activity detection parameters.
    pub vad: VadSettings,
    /// Microphone gate timing for the translation loop.
    pub mic_gate: MicGateSettings,
    /// Collaborator endpoint URLs.
    pub endpoints: EndpointSettings,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            voice: "sage".to_string(),
            transcription_model: "whisper-1".to_string(),
            vad: VadSettings::default(),
            mic_gate: MicGateSettings::default(),
            endpoints: EndpointSettings::default(),
        }
    }
}

impl RealtimeSettings {
    /// Parse settings from a JSON overlay, falling back to defaults for
    /// missing fields. A malformed overlay is rejected, not half-applied.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Server VAD turn-detection parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VadSettings {
    /// Activation threshold.
    pub threshold: f64,
    /// Audio retained before detected speech, in ms.
    pub prefix_padding_ms: u64,
    /// Silence required to end a turn, in ms.
    pub silence_duration_ms: u64,
    /// Longer silence window for directional translators, so drawn-out
    /// translated utterances are not cut off mid-sentence.
    pub translator_silence_duration_ms: u64,
}

impl Default for VadSettings {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            prefix_padding_ms: 300,
            silence_duration_ms: 800,
            translator_silence_duration_ms: 1000,
        }
    }
}

/// Microphone gate timing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MicGateSettings {
    /// Minimum delay before unmuting after a translated reply, in ms.
    pub min_unmute_delay_ms: u64,
    /// Extra delay per character of the produced reply, in ms.
    pub unmute_delay_per_char_ms: u64,
}

impl Default for MicGateSettings {
    fn default() -> Self {
        Self {
            min_unmute_delay_ms: 3000,
            unmute_delay_per_char_ms: 75,
        }
    }
}

/// Collaborator endpoint URLs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointSettings {
    /// Mail-send endpoint.
    pub mail: String,
    /// Streaming report-drafting endpoint.
    pub scribe: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            mail: "/api/sendEmail".to_string(),
            scribe: "/api/operativeScribeServer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let settings = RealtimeSettings::default();
        assert_eq!(settings.voice, "sage");
        assert_eq!(settings.transcription_model, "whisper-1");
        assert!((settings.vad.threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(settings.vad.prefix_padding_ms, 300);
        assert_eq!(settings.vad.silence_duration_ms, 800);
        assert_eq!(settings.vad.translator_silence_duration_ms, 1000);
        assert_eq!(settings.mic_gate.min_unmute_delay_ms, 3000);
    }

    #[test]
    fn partial_overlay_keeps_defaults() {
        let settings = RealtimeSettings::from_json(r#"{"voice": "alloy"}"#).unwrap();
        assert_eq!(settings.voice, "alloy");
        assert_eq!(settings.transcription_model, "whisper-1");
        assert_eq!(settings.vad.silence_duration_ms, 800);
    }

    #[test]
    fn nested_overlay_applies() {
        let settings =
            RealtimeSettings::from_json(r#"{"vad": {"silenceDurationMs": 600}}"#).unwrap();
        assert_eq!(settings.vad.silence_duration_ms, 600);
        // Sibling fields of the overridden section keep their defaults.
        assert_eq!(settings.vad.prefix_padding_ms, 300);
    }

    #[test]
    fn malformed_overlay_is_rejected() {
        assert!(RealtimeSettings::from_json("{not json").is_err());
    }
}
