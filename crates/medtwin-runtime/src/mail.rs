//! Mail collaborator — posts the finished operative report to the mail
//! endpoint.
//!
//! Send is triggered only from tool execution (the editor's email tool);
//! failures are logged and surfaced as breadcrumbs, never as session
//! crashes.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use medtwin_core::settings::EndpointSettings;

/// Mail-send failure.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Transport or HTTP failure.
    #[error("mail request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("mail endpoint returned {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },
}

/// Outbound mail payload.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct MailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// HTML body, only when the source carries markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl MailMessage {
    /// Build a message from a report body: the subject is the first ten
    /// words of the stripped text, and an HTML part is attached only when
    /// the body actually contains markup.
    #[must_use]
    pub fn from_report(to: impl Into<String>, body: &str) -> Self {
        let contains_markup = looks_like_html(body);
        let text = if contains_markup {
            strip_tags(body)
        } else {
            body.to_owned()
        };
        Self {
            to: to.into(),
            subject: subject_from(&text),
            text,
            html: contains_markup.then(|| body.to_owned()),
        }
    }
}

/// First ten words of the body, ellipsized.
fn subject_from(text: &str) -> String {
    let head: Vec<&str> = text.split_whitespace().take(10).collect();
    format!("{}...", head.join(" "))
}

fn looks_like_html(body: &str) -> bool {
    body.find('<')
        .and_then(|open| body[open + 1..].chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic())
        && body.contains('>')
}

/// Drop anything between angle brackets. Crude, matching the upstream
/// mail path's regex strip.
fn strip_tags(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_tag = false;
    for c in body.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// The mail-send collaborator boundary.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// The configured recipient address.
    fn recipient(&self) -> &str;

    /// Deliver one message.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// HTTP implementation posting JSON to the configured mail endpoint.
pub struct HttpMailSender {
    client: reqwest::Client,
    endpoint: String,
    recipient: String,
}

impl HttpMailSender {
    /// Create a sender for the configured endpoint and recipient.
    #[must_use]
    pub fn new(base_url: &str, endpoints: &EndpointSettings, recipient: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), endpoints.mail),
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl MailSender for HttpMailSender {
    fn recipient(&self) -> &str {
        &self.recipient
    }

    #[instrument(skip_all, fields(subject = %message.subject))]
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected {
                status: status.as_u16(),
            });
        }
        debug!("report mailed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn subject_is_the_first_ten_words() {
        let body = "one two three four five six seven eight nine ten eleven twelve";
        let message = MailMessage::from_report("doc@example.test", body);
        assert_eq!(
            message.subject,
            "one two three four five six seven eight nine ten..."
        );
        assert!(message.html.is_none());
    }

    #[test]
    fn markup_bodies_keep_an_html_part() {
        let body = "<p>Operative summary</p>";
        let message = MailMessage::from_report("doc@example.test", body);
        assert_eq!(message.text, "Operative summary");
        assert_eq!(message.html.as_deref(), Some(body));
    }

    #[test]
    fn markdown_is_not_mistaken_for_markup() {
        let body = "# OPERATIVE REPORT\n\nblood loss < 100ml";
        let message = MailMessage::from_report("doc@example.test", body);
        assert!(message.html.is_none());
        assert_eq!(message.text, body);
    }

    #[tokio::test]
    async fn posts_the_documented_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sendEmail"))
            .and(body_partial_json(serde_json::json!({
                "to": "doc@example.test",
                "subject": "# OPERATIVE REPORT ## PATIENT INFORMATION 65M...",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sender = HttpMailSender::new(
            &server.uri(),
            &EndpointSettings::default(),
            "doc@example.test",
        );
        let message = MailMessage::from_report(
            sender.recipient(),
            "# OPERATIVE REPORT\n\n## PATIENT INFORMATION\n65M",
        );
        sender.send(&message).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sender = HttpMailSender::new(
            &server.uri(),
            &EndpointSettings::default(),
            "doc@example.test",
        );
        let err = sender
            .send(&MailMessage::from_report("doc@example.test", "body"))
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Rejected { status: 500 }));
    }
}
