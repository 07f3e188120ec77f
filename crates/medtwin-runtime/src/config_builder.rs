//! Session configuration builder.
//!
//! Pure and deterministic: the same agent, push-to-talk flag, and settings
//! always produce the same [`SessionConfig`]. Building never sends anything;
//! the orchestrator decides when to transmit and whether a synthetic opening
//! turn follows.

use medtwin_agents::AgentDefinition;
use medtwin_core::events::{SessionConfig, TranscriptionDirective, TurnDetection};
use medtwin_core::settings::RealtimeSettings;

/// Build the full session configuration for the given active agent.
///
/// Push-to-talk disables server-side turn detection entirely (serialized as
/// an explicit `null`). Otherwise server VAD is used, with a longer silence
/// window for directional translators so drawn-out translated utterances are
/// not cut off mid-sentence.
#[must_use]
pub fn build_session_config(
    agent: &AgentDefinition,
    push_to_talk: bool,
    settings: &RealtimeSettings,
) -> SessionConfig {
    let turn_detection = if push_to_talk {
        None
    } else {
        let silence_duration_ms = if agent.is_translator() {
            settings.vad.translator_silence_duration_ms
        } else {
            settings.vad.silence_duration_ms
        };
        Some(TurnDetection {
            detection_type: "server_vad".to_string(),
            threshold: settings.vad.threshold,
            prefix_padding_ms: settings.vad.prefix_padding_ms,
            silence_duration_ms,
            create_response: true,
        })
    };

    SessionConfig {
        modalities: vec!["text".to_string(), "audio".to_string()],
        instructions: agent.instructions.clone(),
        voice: settings.voice.clone(),
        input_audio_format: "pcm16".to_string(),
        output_audio_format: "pcm16".to_string(),
        input_audio_transcription: TranscriptionDirective {
            model: settings.transcription_model.clone(),
        },
        turn_detection,
        tools: agent.tools.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medtwin_agents::AgentRole;
    use medtwin_core::languages::{Language, LanguagesContext};

    fn settings() -> RealtimeSettings {
        RealtimeSettings::default()
    }

    #[test]
    fn push_to_talk_disables_turn_detection() {
        let agent = AgentDefinition::new("chief", AgentRole::General, "d", "prompt");
        let config = build_session_config(&agent, true, &settings());
        assert!(config.turn_detection.is_none());

        // PTT must serialize as an explicit null, not an absent field.
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["turn_detection"].is_null());
        assert!(json.get("turn_detection").is_some());
    }

    #[test]
    fn open_mic_uses_server_vad() {
        let agent = AgentDefinition::new("chief", AgentRole::General, "d", "prompt");
        let config = build_session_config(&agent, false, &settings());
        let vad = config.turn_detection.unwrap();
        assert_eq!(vad.detection_type, "server_vad");
        assert!((vad.threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(vad.prefix_padding_ms, 300);
        assert_eq!(vad.silence_duration_ms, 800);
        assert!(vad.create_response);
    }

    #[test]
    fn translators_get_the_longer_silence_window() {
        let languages = LanguagesContext::new(Language::English, Language::Spanish);
        let translator = medtwin_agents::profiles::doctor_to_patient(&languages);
        let config = build_session_config(&translator, false, &settings());
        assert_eq!(config.turn_detection.unwrap().silence_duration_ms, 1000);
    }

    #[test]
    fn instructions_and_tools_round_trip_unchanged() {
        let registry = medtwin_agents::profiles::default_registry().unwrap();
        let editor = registry.lookup("surgicalEditor").unwrap();
        let config = build_session_config(editor, false, &settings());
        assert_eq!(config.instructions, editor.instructions);
        assert_eq!(config.tools, editor.tools);

        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn building_is_deterministic() {
        let agent = AgentDefinition::new("chief", AgentRole::General, "d", "prompt");
        let a = build_session_config(&agent, false, &settings());
        let b = build_session_config(&agent, false, &settings());
        assert_eq!(a, b);
    }
}
