use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// A rendered e-mail ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notification queue is closed")]
    QueueClosed,
}

/// Delivers rendered mails
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError>;
}

/// Mailer that only logs what would have been sent.
/// Used when no mail provider is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        info!(
            to = %mail.to,
            from = %mail.from,
            subject = %mail.subject,
            "Mail delivery disabled, logging notification instead"
        );
        debug!(body = %mail.body, "Notification body");
        Ok(())
    }
}

pub const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Mailer backed by the SendGrid v3 HTTP API
pub struct SendGridMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridAddress<'a>>,
}

#[derive(Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<SendGridPersonalization<'a>>,
    from: SendGridAddress<'a>,
    subject: &'a str,
    content: Vec<SendGridContent<'a>>,
}

impl<'a> From<&'a OutgoingMail> for SendGridRequest<'a> {
    fn from(mail: &'a OutgoingMail) -> Self {
        Self {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridAddress { email: &mail.to }],
            }],
            from: SendGridAddress { email: &mail.from },
            subject: &mail.subject,
            content: vec![SendGridContent {
                content_type: "text/plain",
                value: &mail.body,
            }],
        }
    }
}

impl SendGridMailer {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Latter/0.1")
            .build()
            .map_err(|e| NotifyError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    #[instrument(skip(self, mail), fields(to = %mail.to, subject = %mail.subject))]
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendGridRequest::from(mail))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Mail accepted by SendGrid");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sendgrid_payload_shape() {
        let mail = OutgoingMail {
            to: "bob@example.org".to_string(),
            from: "alice@example.org".to_string(),
            subject: "New Challenge on Latter".to_string(),
            body: "Hi Bob".to_string(),
        };

        let payload = serde_json::to_value(SendGridRequest::from(&mail)).unwrap();

        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            "bob@example.org"
        );
        assert_eq!(payload["from"]["email"], "alice@example.org");
        assert_eq!(payload["subject"], "New Challenge on Latter");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][0]["value"], "Hi Bob");
    }

    #[tokio::test]
    async fn test_sendgrid_unreachable_endpoint_is_transport_error() {
        let mailer = SendGridMailer::new(
            "key",
            "http://127.0.0.1:9/v3/mail/send",
            Duration::from_millis(500),
        )
        .unwrap();
        let mail = OutgoingMail {
            to: "bob@example.org".to_string(),
            from: "alice@example.org".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };

        let result = mailer.send(&mail).await;
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mail = OutgoingMail {
            to: "bob@example.org".to_string(),
            from: "alice@example.org".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(LogMailer.send(&mail).await.is_ok());
    }
}
