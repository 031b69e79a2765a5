use super::{email::SubscriberEmail, token::SubscriptionToken};
use crate::domain::newsletter::models::newsletter::NewsletterId;
use crate::domain::subscriber::errors::SubscriberError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SubscriberId = Uuid;

#[derive(Deserialize, Debug)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub newsletter_id: NewsletterId,
    pub email: SubscriberEmail,
    pub confirmed: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub confirmation_token: SubscriptionToken,
    pub unsubscribe_token: SubscriptionToken,
}

impl Subscriber {
    /// A fresh, unconfirmed subscription with newly drawn tokens.
    pub fn new(
        newsletter_id: NewsletterId,
        request: SubscribeRequest,
        now: DateTime<Utc>,
    ) -> Result<Subscriber, SubscriberError> {
        let email = SubscriberEmail::parse(request.email)?;
        Ok(Self {
            id: Uuid::new_v4(),
            newsletter_id,
            email,
            confirmed: false,
            subscribed_at: now,
            unsubscribed_at: None,
            confirmation_token: SubscriptionToken::new(),
            unsubscribe_token: SubscriptionToken::new(),
        })
    }

    pub fn receives_posts(&self) -> bool {
        self.confirmed && self.unsubscribed_at.is_none()
    }
}

/// Public view of a subscriber; tokens never leave the service.
#[derive(Debug, Serialize)]
pub struct SubscriberDto {
    pub id: SubscriberId,
    pub newsletter_id: NewsletterId,
    pub email: String,
    pub confirmed: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl From<&Subscriber> for SubscriberDto {
    fn from(subscriber: &Subscriber) -> Self {
        Self {
            id: subscriber.id,
            newsletter_id: subscriber.newsletter_id,
            email: subscriber.email.as_str().to_string(),
            confirmed: subscriber.confirmed,
            subscribed_at: subscriber.subscribed_at,
            unsubscribed_at: subscriber.unsubscribed_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmedSubscriber(SubscriberEmail);

impl ConfirmedSubscriber {
    pub fn new(subscriber: &Subscriber) -> Result<Self, String> {
        if subscriber.receives_posts() {
            Ok(ConfirmedSubscriber(subscriber.email.clone()))
        } else {
            Err(format!(
                "Subscriber {} is not an active confirmed subscriber",
                subscriber.id
            ))
        }
    }

    /// Trusted path for rows already filtered as confirmed by the store.
    pub fn from_email(email: SubscriberEmail) -> Self {
        ConfirmedSubscriber(email)
    }

    pub fn email(&self) -> &SubscriberEmail {
        &self.0
    }
}
