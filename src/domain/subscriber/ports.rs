use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    editor::EditorId,
    newsletter::models::newsletter::NewsletterId,
    subscriber::{
        errors::SubscriberError,
        models::{
            subscriber::{ConfirmedSubscriber, SubscribeRequest, Subscriber},
            token::SubscriptionToken,
        },
    },
};

#[async_trait]
/// Store of subscriber data
pub trait SubscriberRepository: Send + Sync + 'static {
    /// Insert a new subscriber, `AlreadySubscribed` if the e-mail is taken for that newsletter
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), SubscriberError>;

    /// Flip the confirmed flag of the subscriber holding `token`
    async fn confirm_by_token(&self, token: &SubscriptionToken)
        -> Result<Subscriber, SubscriberError>;

    /// Stamp `unsubscribed_at`; a token already redeemed yields `NotFound`
    async fn unsubscribe_by_token(
        &self,
        token: &SubscriptionToken,
        at: DateTime<Utc>,
    ) -> Result<Subscriber, SubscriberError>;

    async fn list_by_newsletter(
        &self,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Subscriber>, SubscriberError>;

    /// Confirmed, still-subscribed recipients of a newsletter. Rows whose stored
    /// contact details no longer parse come back as individual errors.
    async fn list_confirmed(
        &self,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Result<ConfirmedSubscriber, SubscriberError>>, SubscriberError>;
}

#[async_trait]
pub trait SubscriptionService: Send + Sync + 'static {
    async fn subscribe(
        &self,
        newsletter_id: NewsletterId,
        request: SubscribeRequest,
    ) -> Result<Subscriber, SubscriberError>;

    async fn confirm(&self, token: String) -> Result<Subscriber, SubscriberError>;

    async fn unsubscribe(&self, token: String) -> Result<Subscriber, SubscriberError>;

    async fn list_subscribers(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Subscriber>, SubscriberError>;
}
