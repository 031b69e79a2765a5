use crate::{
    domain::subscriber::{models::subscriber::SubscriberDto, ports::SubscriptionService},
    inbound::http::{errors::AppError, state::SharedSubscriptionState},
};
use actix_web::{web, HttpResponse};

#[tracing::instrument(name = "Confirm a pending subscriber", skip(token, state))]
pub async fn confirm<SS: SubscriptionService>(
    token: web::Path<String>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let subscriber = state
        .subscription_service()
        .confirm(token.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(SubscriberDto::from(&subscriber)))
}
