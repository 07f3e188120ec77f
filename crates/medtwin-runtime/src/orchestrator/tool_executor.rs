//! Tool execution — resolution, dispatch, and intent application.
//!
//! Resolution order for a pending call: the active agent's own handler,
//! then the reserved hand-off tool, then the generic affirmative fallback.
//! Every path answers the peer with a `function_call_output` and records a
//! breadcrumb, so the peer's turn-taking loop is never left stalled —
//! handler failures included.

use std::time::Instant;

use metrics::{counter, histogram};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use medtwin_agents::{HANDOFF_TOOL, ToolCallContext, ToolIntent};
use medtwin_core::events::{ClientEvent, PendingToolCall};

use crate::emitter::{ToolPath, TwinEvent};
use crate::errors::RuntimeError;
use crate::mail::MailMessage;

use super::Orchestrator;

impl Orchestrator {
    /// Execute one pending tool call against the active agent.
    #[instrument(skip_all, fields(tool = call.name))]
    pub(crate) async fn execute_tool(&self, call: PendingToolCall) -> Result<(), RuntimeError> {
        let start = Instant::now();
        let agent = self.active_agent_name();

        let args: Value = match serde_json::from_str(&call.arguments) {
            Ok(args) => args,
            Err(err) => {
                // Malformed arguments must not stall the turn; hand the
                // handler an empty object and let it complain.
                warn!(%err, "malformed tool arguments");
                json!({})
            }
        };
        self.ledger
            .lock()
            .add_breadcrumb(&format!("function call: {}", call.name), Some(args.clone()));

        let handler = self.state.lock().active_agent.handler(&call.name);
        let path = if let Some(handler) = handler {
            let ctx = ToolCallContext {
                transcript: self.ledger.lock().items(),
                languages: self.state.lock().languages.clone(),
            };
            match handler.handle(args, &ctx).await {
                Ok(outcome) => {
                    self.ledger.lock().add_breadcrumb(
                        &format!("function call result: {}", call.name),
                        Some(outcome.payload.clone()),
                    );
                    self.answer_call(&call, &outcome.payload).await?;
                    if let Some(intent) = outcome.intent {
                        self.apply_intent(intent).await?;
                    }
                }
                Err(err) => {
                    // Absorbed: the failing call answers with an error
                    // payload instead of crashing the session.
                    warn!(%err, "tool handler failed");
                    let payload = json!({ "error": err.to_string() });
                    self.ledger.lock().add_breadcrumb(
                        &format!("function call failed: {}", call.name),
                        Some(payload.clone()),
                    );
                    self.answer_call(&call, &payload).await?;
                }
            }
            ToolPath::Handler
        } else if call.name == HANDOFF_TOOL {
            let destination = args
                .get("destination_agent")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let resolved = self.resolve_destination(&destination);
            let output = json!({
                "destination_agent": destination,
                "did_transfer": resolved.is_some(),
            });
            // Answer before reconfiguring, so the call is never left open
            // across the session.update. The opening turn (or, for
            // translators, the next real utterance) drives the reply; no
            // response.create here.
            self.gateway
                .send(ClientEvent::function_call_output(
                    call.call_id.clone(),
                    output.to_string(),
                ))
                .await?;
            self.ledger.lock().add_breadcrumb(
                &format!("function call: {HANDOFF_TOOL} response"),
                Some(output),
            );
            match resolved {
                Some(agent) => self.complete_hand_off(agent, &destination).await?,
                None => self.refuse_hand_off(&destination),
            }
            ToolPath::Handoff
        } else {
            // Unknown tool: a generic affirmative keeps the protocol moving.
            debug!("unknown tool, answering with the generic result");
            let payload = json!({ "result": true });
            self.ledger.lock().add_breadcrumb(
                &format!("function call fallback: {}", call.name),
                Some(payload.clone()),
            );
            self.answer_call(&call, &payload).await?;
            ToolPath::Fallback
        };

        counter!("tool_executions_total", "tool" => call.name.clone()).increment(1);
        histogram!("tool_execution_duration_seconds", "tool" => call.name.clone())
            .record(start.elapsed().as_secs_f64());
        let _ = self.emitter.emit(TwinEvent::ToolExecuted {
            agent,
            tool: call.name,
            path,
        });
        Ok(())
    }

    /// Answer the peer with a function-call output and request a reply.
    async fn answer_call(
        &self,
        call: &PendingToolCall,
        payload: &Value,
    ) -> Result<(), RuntimeError> {
        self.gateway
            .send(ClientEvent::function_call_output(
                call.call_id.clone(),
                payload.to_string(),
            ))
            .await?;
        self.gateway.send(ClientEvent::ResponseCreate).await?;
        Ok(())
    }

    /// Apply a state change requested by a tool handler. The orchestrator
    /// is the single owner of mutation; handlers only describe it.
    async fn apply_intent(&self, intent: ToolIntent) -> Result<(), RuntimeError> {
        match intent {
            ToolIntent::SetLanguages(languages) => {
                debug!(doctor = %languages.doctor, patient = %languages.patient, "language context set");
                self.ledger.lock().add_breadcrumb(
                    "language context set",
                    Some(json!({
                        "doctor": languages.doctor,
                        "patient": languages.patient,
                    })),
                );
                self.state.lock().languages = Some(languages);
            }

            ToolIntent::LanguageDetected(detected) => {
                self.route_detection(detected).await?;
            }

            ToolIntent::ReportDrafted(report) => {
                let chars = report.chars().count();
                self.ledger
                    .lock()
                    .add_breadcrumb("operative report drafted", None);
                self.state.lock().report = report;
                let _ = self.emitter.emit(TwinEvent::ReportUpdated { chars });
            }

            ToolIntent::ReportAppended(update) => {
                let chars = {
                    let mut state = self.state.lock();
                    if !state.report.is_empty() {
                        state.report.push_str("\n\n");
                    }
                    state.report.push_str(&update);
                    state.report.chars().count()
                };
                self.ledger
                    .lock()
                    .add_breadcrumb("report updated", Some(json!({ "update": update })));
                let _ = self.emitter.emit(TwinEvent::ReportUpdated { chars });
            }

            ToolIntent::EmailReport => {
                self.email_report().await;
            }
        }
        Ok(())
    }

    /// Mail the current report. Failures are logged and recorded as
    /// breadcrumbs, never raised — the session keeps going.
    async fn email_report(&self) {
        let report = self.report();
        if report.is_empty() {
            warn!("email requested with no report drafted");
            self.ledger
                .lock()
                .add_breadcrumb("email skipped: no report", None);
            return;
        }
        let Some(mail) = &self.mail else {
            warn!("email requested with no mail sender configured");
            self.ledger
                .lock()
                .add_breadcrumb("email skipped: no mail sender", None);
            return;
        };

        let message = MailMessage::from_report(mail.recipient(), &report);
        match mail.send(&message).await {
            Ok(()) => {
                counter!("report_emails_total", "outcome" => "sent").increment(1);
                self.ledger.lock().add_breadcrumb(
                    "report emailed",
                    Some(json!({ "subject": message.subject })),
                );
            }
            Err(err) => {
                counter!("report_emails_total", "outcome" => "failed").increment(1);
                warn!(%err, "report email failed");
                self.ledger
                    .lock()
                    .add_breadcrumb("email failed", Some(json!({ "error": err.to_string() })));
            }
        }
    }
}
