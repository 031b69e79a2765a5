use async_trait::async_trait;

use crate::domain::subscriber::models::email::SubscriberEmail;

#[async_trait]
/// Outbound transactional mail. One call delivers one message to every recipient.
pub trait MailDispatcher: Send + Sync + 'static {
    async fn send(
        &self,
        recipients: &[SubscriberEmail],
        message: &MailMessage,
    ) -> Result<(), MailDispatchError>;
}

#[derive(thiserror::Error, Debug)]
pub enum MailDispatchError {
    #[error("Mail API rejected the message with status {0}")]
    Rejected(u16),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MessageError {
    #[error("Mail subject cannot be blank")]
    BlankSubject,
    #[error("Mail subject must fit on a single line")]
    MultilineSubject,
    #[error("Mail body cannot be blank")]
    BlankBody,
}

/// Subject plus an HTML body and an optional plain-text alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    subject: String,
    html: String,
    text: Option<String>,
}

impl MailMessage {
    /// A blank plain-text part is dropped rather than sent empty.
    pub fn new(
        subject: String,
        html: String,
        text: Option<String>,
    ) -> Result<MailMessage, MessageError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(MessageError::BlankSubject);
        }
        // a line break here would let content spill into the mail headers
        if subject.contains(['\r', '\n']) {
            return Err(MessageError::MultilineSubject);
        }
        if html.trim().is_empty() {
            return Err(MessageError::BlankBody);
        }
        Ok(Self {
            subject: subject.to_string(),
            html,
            text: text.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}
