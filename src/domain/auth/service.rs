use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};

use super::ports::AuthService;
use crate::domain::auth::credentials::{BearerToken, Claims, CredentialsError};
use crate::domain::editor::EditorId;

/// Verifies HS256 JWTs signed with the secret shared with the identity provider.
#[derive(Clone)]
pub struct JwtAuth {
    secret: Secret<String>,
}

impl JwtAuth {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    /// Signature, algorithm and expiry are all checked; no clock leeway is granted.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialsError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());

        jsonwebtoken::decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "Access token expired".to_string(),
                    ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
                    ErrorKind::InvalidAlgorithm => "Unsupported signing algorithm".to_string(),
                    _ => format!("Malformed access token: {}", e),
                };
                CredentialsError::AuthError(reason)
            })
    }
}

#[async_trait]
impl AuthService for JwtAuth {
    #[tracing::instrument(
        name = "Authenticate editor",
        skip(self, token),
        fields(editor_id = tracing::field::Empty)
    )]
    async fn authenticate(&self, token: &BearerToken) -> Result<EditorId, CredentialsError> {
        let claims = self.verify(token.expose())?;
        let editor_id = EditorId::new(claims.sub);
        tracing::Span::current().record("editor_id", tracing::field::display(&editor_id));
        Ok(editor_id)
    }
}
