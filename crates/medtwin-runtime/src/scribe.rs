//! Scribe collaborator — streams a long-form surgical note from the
//! report-drafting endpoint.
//!
//! The endpoint takes the conversation so far as a message list and
//! produces the document incrementally; the client exposes it as a text
//! stream so the UI can render the note as it is written.

use futures::{Stream, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::instrument;

use medtwin_core::settings::EndpointSettings;

/// Report-drafting failure.
#[derive(Debug, thiserror::Error)]
pub enum ScribeError {
    /// Transport or HTTP failure.
    #[error("scribe request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("scribe endpoint returned {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },
}

/// One message of the conversation handed to the drafting endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct ScribeMessage {
    /// Speaker role (`user` / `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ScribeMessage {
    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Client for the streaming report-drafting endpoint.
pub struct ScribeClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ScribeClient {
    /// Create a client for the configured endpoint.
    #[must_use]
    pub fn new(base_url: &str, endpoints: &EndpointSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), endpoints.scribe),
        }
    }

    /// Post the message list and stream the drafted note as text chunks.
    #[instrument(skip_all, fields(messages = messages.len()))]
    pub async fn draft(
        &self,
        messages: &[ScribeMessage],
    ) -> Result<impl Stream<Item = Result<String, ScribeError>> + use<>, ScribeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "messages": messages }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScribeError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(response
            .bytes_stream()
            .map(|chunk| match chunk {
                Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Err(err) => Err(ScribeError::from(err)),
            }))
    }

    /// Convenience: stream the whole note into one string.
    pub async fn draft_to_string(&self, messages: &[ScribeMessage]) -> Result<String, ScribeError> {
        let stream = self.draft(messages).await?;
        stream.try_collect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn streams_the_drafted_note() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/operativeScribeServer"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "knee replacement, 65M"}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("## OPERATIVE NOTE\nTotal knee..."),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ScribeClient::new(&server.uri(), &EndpointSettings::default());
        let note = client
            .draft_to_string(&[ScribeMessage::user("knee replacement, 65M")])
            .await
            .unwrap();
        assert_eq!(note, "## OPERATIVE NOTE\nTotal knee...");
    }

    #[tokio::test]
    async fn rejection_surfaces_the_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = ScribeClient::new(&server.uri(), &EndpointSettings::default());
        let err = client.draft_to_string(&[]).await.unwrap_err();
        assert!(matches!(err, ScribeError::Rejected { status: 400 }));
    }
}
