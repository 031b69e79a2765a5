use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw token lifted from an `Authorization: Bearer` header.
#[derive(Debug)]
pub struct BearerToken(Secret<String>);

impl BearerToken {
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Claims the identity provider puts in an access token. Only the subject and
/// expiry matter here.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
}

#[derive(thiserror::Error, Debug)]
pub enum CredentialsError {
    #[error("Authentication error: {0}")]
    AuthError(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
