use crate::domain::newsletter::errors::NewsletterError;
use crate::domain::subscriber::models::email::InvalidEmail;

#[derive(thiserror::Error, Debug)]
pub enum SubscriberError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Already subscribed: {0}")]
    AlreadySubscribed(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<InvalidEmail> for SubscriberError {
    fn from(value: InvalidEmail) -> Self {
        Self::ValidationError(value.to_string())
    }
}

impl From<NewsletterError> for SubscriberError {
    fn from(error: NewsletterError) -> Self {
        match error {
            NewsletterError::ValidationError(e) => SubscriberError::ValidationError(e),
            NewsletterError::NotFound(e) => SubscriberError::NotFound(e),
            NewsletterError::Forbidden(e) => SubscriberError::Forbidden(e),
            NewsletterError::Unexpected(e) => SubscriberError::Unexpected(e),
        }
    }
}
