//! The bidirectional translation loop: coordinator → detector → directional
//! translator → back to the detector, with mic gating around each turn.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::task::yield_now;
use tokio::time::{advance, pause};

use medtwin_agents::profiles::default_registry;
use medtwin_core::events::{ClientEvent, ServerEvent};
use medtwin_core::settings::RealtimeSettings;
use medtwin_runtime::testutil::RecordingGateway;
use medtwin_runtime::{Orchestrator, RealtimeGateway};

fn event(value: serde_json::Value) -> ServerEvent {
    serde_json::from_value(value).unwrap()
}

async fn call_tool(orch: &Orchestrator, name: &str, args: serde_json::Value) {
    orch.handle_event(event(json!({
        "type": "response.done",
        "response": {
            "output": [{
                "type": "function_call",
                "name": name,
                "call_id": "call_1",
                "arguments": args.to_string()
            }]
        }
    })))
    .await
    .unwrap();
}

/// Connect and walk the session to the detector with an english/arabic pair.
async fn detector_session() -> (Orchestrator, Arc<RecordingGateway>) {
    let registry = Arc::new(default_registry().unwrap());
    let gateway = Arc::new(RecordingGateway::new());
    let orch = Orchestrator::new(
        registry,
        Arc::clone(&gateway) as Arc<dyn RealtimeGateway>,
        RealtimeSettings::default(),
    );
    orch.connect();
    orch.handle_event(event(json!({
        "type": "session.created",
        "session": { "id": "sess_t" }
    })))
    .await
    .unwrap();

    call_tool(&orch, "transferAgents", json!({ "destination_agent": "translationCoordinator" }))
        .await;
    call_tool(
        &orch,
        "setLanguageContext",
        json!({ "doctorLanguage": "english", "patientLanguage": "arabic" }),
    )
    .await;
    call_tool(&orch, "transferAgents", json!({ "destination_agent": "languageDetector" })).await;
    assert_eq!(orch.active_agent_name(), "languageDetector");
    gateway.clear_sent();
    (orch, gateway)
}

#[tokio::test]
async fn doctor_language_routes_to_the_doctor_to_patient_translator() {
    let (orch, gateway) = detector_session().await;

    call_tool(&orch, "detectLanguage", json!({ "language": "english" })).await;

    assert_eq!(orch.active_agent_name(), "doctorToPatient");

    // The detector's tool answer goes out first, then the translator
    // activation: session.update only — no buffer clear, no synthetic turn.
    assert_eq!(
        gateway.event_types(),
        vec![
            "conversation.item.create",
            "response.create",
            "session.update",
        ]
    );
    let sent = gateway.sent_events();
    let ClientEvent::SessionUpdate { session } = &sent[2] else {
        panic!("expected session.update");
    };
    // Translators get the longer silence window and translator instructions.
    assert_eq!(session.turn_detection.as_ref().unwrap().silence_duration_ms, 1000);
    assert!(session.instructions.contains("arabic"));
    assert!(session.tools.is_empty());
}

#[tokio::test]
async fn patient_language_routes_the_other_way() {
    let (orch, _gateway) = detector_session().await;
    call_tool(&orch, "detectLanguage", json!({ "language": "arabic" })).await;
    assert_eq!(orch.active_agent_name(), "patientToDoctor");
}

#[tokio::test]
async fn third_language_stays_in_detection_with_a_corrective_turn() {
    let (orch, gateway) = detector_session().await;

    call_tool(&orch, "detectLanguage", json!({ "language": "german" })).await;

    assert_eq!(orch.active_agent_name(), "languageDetector");
    // No reconfiguration; the corrective hidden turn and its trigger go out
    // after the tool answer.
    assert_eq!(
        gateway.event_types(),
        vec![
            "conversation.item.create",
            "response.create",
            "conversation.item.create",
            "response.create",
        ]
    );
    let corrective = orch
        .transcript()
        .into_iter()
        .filter(|i| i.is_hidden)
        .next_back()
        .unwrap();
    assert!(corrective.title.contains("german"));
    assert!(corrective.title.contains("english"));
    assert!(corrective.title.contains("arabic"));
}

#[tokio::test]
async fn undetected_prompts_a_repeat_without_switching() {
    let (orch, gateway) = detector_session().await;

    call_tool(&orch, "detectLanguage", json!({ "language": "" })).await;

    assert_eq!(orch.active_agent_name(), "languageDetector");
    let corrective = orch
        .transcript()
        .into_iter()
        .filter(|i| i.is_hidden)
        .next_back()
        .unwrap();
    assert!(corrective.title.contains("could not be identified"));
    assert!(gateway.event_types().contains(&"response.create"));
}

#[tokio::test]
async fn speech_stopped_mutes_only_while_a_translator_is_active() {
    let (orch, gateway) = detector_session().await;

    // Detector active: speech boundaries do not gate the mic.
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_started" })))
        .await
        .unwrap();
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_stopped" })))
        .await
        .unwrap();
    assert!(gateway.mute_transitions().is_empty());

    call_tool(&orch, "detectLanguage", json!({ "language": "english" })).await;
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_started" })))
        .await
        .unwrap();
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_stopped" })))
        .await
        .unwrap();
    assert_eq!(gateway.mute_transitions(), vec![true]);
}

#[tokio::test]
async fn translation_turn_returns_to_the_detector_and_unmutes_after_playback() {
    pause();
    let (orch, gateway) = detector_session().await;
    call_tool(&orch, "detectLanguage", json!({ "language": "english" })).await;
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_stopped" })))
        .await
        .unwrap();
    gateway.clear_sent();

    // A 100-character translated reply: unmute delay 100 x 75ms = 7500ms.
    let reply = "x".repeat(100);
    orch.handle_event(event(json!({
        "type": "conversation.item.created",
        "item": { "id": "item_t1", "role": "assistant", "content": [] }
    })))
    .await
    .unwrap();
    orch.handle_event(event(json!({
        "type": "response.audio_transcript.delta",
        "item_id": "item_t1",
        "delta": reply
    })))
    .await
    .unwrap();

    orch.handle_event(event(json!({ "type": "response.audio.done" })))
        .await
        .unwrap();

    // Cyclic return: detector active again, reconfigured.
    assert_eq!(orch.active_agent_name(), "languageDetector");
    assert!(gateway.event_types().contains(&"session.update"));

    advance(Duration::from_millis(7499)).await;
    yield_now().await;
    assert_eq!(gateway.mute_transitions(), vec![true]);
    advance(Duration::from_millis(2)).await;
    yield_now().await;
    assert_eq!(gateway.mute_transitions(), vec![true, false]);
}

#[tokio::test]
async fn a_new_utterance_cancels_a_pending_unmute() {
    pause();
    let (orch, gateway) = detector_session().await;
    call_tool(&orch, "detectLanguage", json!({ "language": "english" })).await;
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_stopped" })))
        .await
        .unwrap();
    orch.handle_event(event(json!({ "type": "response.audio.done" })))
        .await
        .unwrap();

    // Short reply: the 3000ms floor applies. Speech starts again first.
    advance(Duration::from_millis(1000)).await;
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_started" })))
        .await
        .unwrap();

    advance(Duration::from_millis(10_000)).await;
    yield_now().await;
    assert_eq!(gateway.mute_transitions(), vec![true]);
}

#[tokio::test]
async fn disconnect_cancels_a_pending_unmute() {
    pause();
    let (orch, gateway) = detector_session().await;
    call_tool(&orch, "detectLanguage", json!({ "language": "english" })).await;
    orch.handle_event(event(json!({ "type": "input_audio_buffer.speech_stopped" })))
        .await
        .unwrap();
    orch.handle_event(event(json!({ "type": "response.audio.done" })))
        .await
        .unwrap();

    orch.disconnect().await;
    advance(Duration::from_millis(10_000)).await;
    yield_now().await;
    assert_eq!(gateway.mute_transitions(), vec![true]);
    assert!(gateway.is_closed());
}
