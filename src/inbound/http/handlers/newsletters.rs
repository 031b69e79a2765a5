use crate::{
    domain::{
        auth::ports::AuthService,
        newsletter::{models::newsletter::NewsletterRequest, ports::NewsletterService},
    },
    inbound::http::{
        auth::authenticated_editor,
        errors::AppError,
        state::{SharedAuthState, SharedNewsletterState},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

#[tracing::instrument(
    name = "Create a newsletter",
    skip(body, newsletter_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn create_newsletter<NS: NewsletterService, AS: AuthService>(
    body: web::Json<NewsletterRequest>,
    newsletter_state: web::Data<SharedNewsletterState<NS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let newsletter = newsletter_state
        .newsletter_service()
        .create_newsletter(editor_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(newsletter))
}

#[tracing::instrument(
    name = "List newsletters",
    skip(newsletter_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn list_newsletters<NS: NewsletterService, AS: AuthService>(
    newsletter_state: web::Data<SharedNewsletterState<NS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let newsletters = newsletter_state
        .newsletter_service()
        .list_newsletters(editor_id)
        .await?;

    Ok(HttpResponse::Ok().json(newsletters))
}

#[tracing::instrument(
    name = "Get a newsletter",
    skip(newsletter_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn get_newsletter<NS: NewsletterService, AS: AuthService>(
    path: web::Path<Uuid>,
    newsletter_state: web::Data<SharedNewsletterState<NS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let newsletter = newsletter_state
        .newsletter_service()
        .get_newsletter(editor_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(newsletter))
}
