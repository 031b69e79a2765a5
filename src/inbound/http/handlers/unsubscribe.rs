use crate::{
    domain::subscriber::ports::SubscriptionService,
    inbound::http::{errors::AppError, state::SharedSubscriptionState},
};
use actix_web::{web, HttpResponse};

#[tracing::instrument(name = "Removing a subscriber", skip(token, state))]
pub async fn unsubscribe<SS: SubscriptionService>(
    token: web::Path<String>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    state
        .subscription_service()
        .unsubscribe(token.into_inner())
        .await?;
    Ok(HttpResponse::Ok().finish())
}
