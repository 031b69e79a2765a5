use async_trait::async_trait;

use crate::domain::auth::credentials::{BearerToken, CredentialsError};
use crate::domain::editor::EditorId;

#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    /// Resolve the editor behind an access token issued by the identity provider.
    async fn authenticate(&self, token: &BearerToken) -> Result<EditorId, CredentialsError>;
}
