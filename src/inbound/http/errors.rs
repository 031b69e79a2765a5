use crate::domain::auth::credentials::CredentialsError;
use crate::domain::newsletter::errors::NewsletterError;
use crate::domain::post::errors::PostError;
use crate::domain::subscriber::errors::SubscriberError;

use actix_web::http::header::{self, HeaderValue};
use actix_web::HttpResponse;
use actix_web::{http::StatusCode, ResponseError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not authenticated: {0}")]
    AuthError(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<PostError> for AppError {
    fn from(error: PostError) -> Self {
        match error {
            PostError::ValidationError(s) => AppError::ValidationError(s),
            PostError::NotFound(s) => AppError::NotFound(s),
            PostError::Forbidden(s) => AppError::Forbidden(s),
            PostError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

impl From<NewsletterError> for AppError {
    fn from(error: NewsletterError) -> Self {
        match error {
            NewsletterError::ValidationError(s) => AppError::ValidationError(s),
            NewsletterError::NotFound(s) => AppError::NotFound(s),
            NewsletterError::Forbidden(s) => AppError::Forbidden(s),
            NewsletterError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

impl From<SubscriberError> for AppError {
    fn from(error: SubscriberError) -> Self {
        match error {
            SubscriberError::ValidationError(s) => AppError::ValidationError(s),
            SubscriberError::NotFound(s) => AppError::NotFound(s),
            SubscriberError::Forbidden(s) => AppError::Forbidden(s),
            SubscriberError::AlreadySubscribed(s) => AppError::Conflict(s),
            SubscriberError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

impl From<CredentialsError> for AppError {
    fn from(error: CredentialsError) -> Self {
        match error {
            CredentialsError::AuthError(s) => AppError::AuthError(s),
            CredentialsError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let message = match self {
            AppError::ValidationError(s)
            | AppError::NotFound(s)
            | AppError::AuthError(s)
            | AppError::Forbidden(s)
            | AppError::Conflict(s) => s.as_str(),
            // the cause chain stays in the logs
            AppError::Unexpected(_) => "Internal server error",
        };
        let mut response =
            HttpResponse::build(self.status_code()).json(ErrorBody { error: message });
        if let AppError::AuthError(_) = self {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
