use crate::{
    domain::subscriber::{
        models::subscriber::{SubscribeRequest, SubscriberDto},
        ports::SubscriptionService,
    },
    inbound::http::{errors::AppError, state::SharedSubscriptionState},
};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

#[tracing::instrument(
    name = "Subscribe to a newsletter",
    skip(body, state),
    fields(subscriber_email = %body.email)
)]
pub async fn subscribe<SS: SubscriptionService>(
    path: web::Path<Uuid>,
    body: web::Json<SubscribeRequest>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let subscriber = state
        .subscription_service()
        .subscribe(path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(SubscriberDto::from(&subscriber)))
}
