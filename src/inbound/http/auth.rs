use actix_web::HttpRequest;

use crate::domain::auth::ports::AuthService;
use crate::domain::editor::EditorId;
use crate::inbound::http::{errors::AppError, state::SharedAuthState};

pub mod bearer;

/// Resolve the calling editor from the request's bearer token.
pub async fn authenticated_editor<AS: AuthService>(
    request: &HttpRequest,
    auth_state: &SharedAuthState<AS>,
) -> Result<EditorId, AppError> {
    let token = bearer::bearer_token(request)?;
    let editor_id = auth_state.auth_service().authenticate(&token).await?;
    tracing::Span::current().record("editor_id", tracing::field::display(&editor_id));
    Ok(editor_id)
}
