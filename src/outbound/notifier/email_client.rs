use crate::configuration::EmailClientSettings;
use crate::domain::notifier::{MailDispatchError, MailDispatcher, MailMessage};
use crate::domain::subscriber::models::email::SubscriberEmail;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

/// Client for a transactional e-mail HTTP API (Resend-compatible).
#[derive(Debug, Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: SubscriberEmail,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(configuration: EmailClientSettings) -> Result<Self, anyhow::Error> {
        let sender = configuration
            .sender()
            .context("Invalid sender email address")?;
        let http_client = Client::builder()
            .timeout(configuration.timeout())
            .build()
            .context("Failed to build the email HTTP client")?;
        Ok(Self {
            http_client,
            base_url: configuration.base_url.trim_end_matches('/').to_string(),
            sender,
            authorization_token: configuration.authorization_token,
        })
    }
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[async_trait]
impl MailDispatcher for EmailClient {
    #[tracing::instrument(
        name = "Send email",
        skip(self, recipients, message),
        fields(recipient_count = recipients.len())
    )]
    async fn send(
        &self,
        recipients: &[SubscriberEmail],
        message: &MailMessage,
    ) -> Result<(), MailDispatchError> {
        let request_body = SendEmailRequest {
            from: self.sender.as_str(),
            to: recipients.iter().map(SubscriberEmail::as_str).collect(),
            subject: message.subject(),
            html: message.html(),
            text: message.text(),
        };
        let url = format!("{}/emails", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .context("Failed to reach the email API")?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailDispatchError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}
