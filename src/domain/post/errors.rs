use crate::domain::newsletter::errors::NewsletterError;
use crate::domain::post::models::status::PostStatusError;

#[derive(thiserror::Error, Debug)]
pub enum PostError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<NewsletterError> for PostError {
    fn from(error: NewsletterError) -> Self {
        match error {
            NewsletterError::ValidationError(e) => PostError::ValidationError(e),
            NewsletterError::NotFound(e) => PostError::NotFound(e),
            NewsletterError::Forbidden(e) => PostError::Forbidden(e),
            NewsletterError::Unexpected(e) => PostError::Unexpected(e),
        }
    }
}

impl From<PostStatusError> for PostError {
    fn from(error: PostStatusError) -> Self {
        PostError::Unexpected(anyhow::anyhow!(error))
    }
}
