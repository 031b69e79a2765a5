use crate::{
    domain::{
        auth::ports::AuthService,
        subscriber::{models::subscriber::SubscriberDto, ports::SubscriptionService},
    },
    inbound::http::{
        auth::authenticated_editor,
        errors::AppError,
        state::{SharedAuthState, SharedSubscriptionState},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

#[tracing::instrument(
    name = "List newsletter subscribers",
    skip(subscription_state, auth_state, request),
    fields(editor_id = tracing::field::Empty)
)]
pub async fn list_subscribers<SS: SubscriptionService, AS: AuthService>(
    path: web::Path<Uuid>,
    subscription_state: web::Data<SharedSubscriptionState<SS>>,
    auth_state: web::Data<SharedAuthState<AS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let editor_id = authenticated_editor(&request, &auth_state).await?;
    let subscribers = subscription_state
        .subscription_service()
        .list_subscribers(editor_id, path.into_inner())
        .await?;

    let subscribers: Vec<SubscriberDto> = subscribers.iter().map(SubscriberDto::from).collect();
    Ok(HttpResponse::Ok().json(subscribers))
}
