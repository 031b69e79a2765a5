#[derive(thiserror::Error, Debug)]
pub enum NewsletterError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Newsletter not found: {0}")]
    NotFound(String),
    #[error("Editor not allowed: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
