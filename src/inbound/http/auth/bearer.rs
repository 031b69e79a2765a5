use actix_web::HttpRequest;

use crate::domain::auth::credentials::{BearerToken, CredentialsError};

pub fn bearer_token(request: &HttpRequest) -> Result<BearerToken, CredentialsError> {
    let header_value = request
        .headers()
        .get("Authorization")
        .ok_or(CredentialsError::AuthError(
            "The 'Authorization' header is missing".to_string(),
        ))?
        .to_str()
        .map_err(|e| CredentialsError::AuthError(e.to_string()))?;
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(CredentialsError::AuthError(
            "The authorization scheme was not 'Bearer'".to_string(),
        ))?
        .trim();
    if token.is_empty() {
        return Err(CredentialsError::AuthError(
            "The bearer token is empty".to_string(),
        ));
    }
    Ok(BearerToken::new(token.to_string()))
}
