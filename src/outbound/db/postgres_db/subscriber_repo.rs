use super::{is_unique_violation, PostgresDb};
use crate::domain::{
    newsletter::models::newsletter::NewsletterId,
    subscriber::{
        errors::SubscriberError,
        models::{
            email::SubscriberEmail,
            subscriber::{ConfirmedSubscriber, Subscriber},
            token::SubscriptionToken,
        },
        ports::SubscriberRepository,
    },
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const SUBSCRIBER_COLUMNS: &str = "id, newsletter_id, email, is_confirmed, subscribed_at, \
     unsubscribed_at, confirmation_token, unsubscribe_token";

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: Uuid,
    newsletter_id: Uuid,
    email: String,
    is_confirmed: bool,
    subscribed_at: DateTime<Utc>,
    unsubscribed_at: Option<DateTime<Utc>>,
    confirmation_token: String,
    unsubscribe_token: String,
}

impl TryFrom<SubscriberRow> for Subscriber {
    type Error = SubscriberError;

    fn try_from(row: SubscriberRow) -> Result<Self, Self::Error> {
        let token = |raw: String| {
            SubscriptionToken::parse(raw)
                .map_err(|e| SubscriberError::Unexpected(anyhow::anyhow!(e)))
        };
        Ok(Self {
            id: row.id,
            newsletter_id: row.newsletter_id,
            email: SubscriberEmail::parse(row.email)?,
            confirmed: row.is_confirmed,
            subscribed_at: row.subscribed_at,
            unsubscribed_at: row.unsubscribed_at,
            confirmation_token: token(row.confirmation_token)?,
            unsubscribe_token: token(row.unsubscribe_token)?,
        })
    }
}

fn unknown_token() -> SubscriberError {
    SubscriberError::NotFound("There is no active subscriber associated with this token".into())
}

#[async_trait]
impl SubscriberRepository for PostgresDb {
    #[tracing::instrument(
        name = "Saving new subscriber details in db",
        skip(self, subscriber),
        fields(subscriber_id = %subscriber.id)
    )]
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), SubscriberError> {
        let query = format!(
            "INSERT INTO subscribers ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            SUBSCRIBER_COLUMNS
        );
        let outcome = sqlx::query(&query)
            .bind(subscriber.id)
            .bind(subscriber.newsletter_id)
            .bind(subscriber.email.as_ref())
            .bind(subscriber.confirmed)
            .bind(subscriber.subscribed_at)
            .bind(subscriber.unsubscribed_at)
            .bind(subscriber.confirmation_token.as_ref())
            .bind(subscriber.unsubscribe_token.as_ref())
            .execute(&self.pool)
            .await;

        match outcome {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(SubscriberError::AlreadySubscribed(format!(
                "{} is already subscribed to this newsletter",
                subscriber.email
            ))),
            Err(e) => Err(anyhow::Error::from(e)
                .context("Failed to insert subscriber")
                .into()),
        }
    }

    #[tracing::instrument(name = "Mark subscriber as confirmed", skip(self, token))]
    async fn confirm_by_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Subscriber, SubscriberError> {
        let query = format!(
            "UPDATE subscribers SET is_confirmed = true \
             WHERE confirmation_token = $1 AND unsubscribed_at IS NULL RETURNING {}",
            SUBSCRIBER_COLUMNS
        );
        let row = sqlx::query_as::<_, SubscriberRow>(&query)
            .bind(token.as_ref())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to confirm subscriber")?;

        row.ok_or_else(unknown_token)?.try_into()
    }

    #[tracing::instrument(name = "Mark subscriber as unsubscribed", skip(self, token))]
    async fn unsubscribe_by_token(
        &self,
        token: &SubscriptionToken,
        at: DateTime<Utc>,
    ) -> Result<Subscriber, SubscriberError> {
        let query = format!(
            "UPDATE subscribers SET unsubscribed_at = $2 \
             WHERE unsubscribe_token = $1 AND unsubscribed_at IS NULL RETURNING {}",
            SUBSCRIBER_COLUMNS
        );
        let row = sqlx::query_as::<_, SubscriberRow>(&query)
            .bind(token.as_ref())
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to unsubscribe subscriber")?;

        row.ok_or_else(unknown_token)?.try_into()
    }

    #[tracing::instrument(name = "List newsletter subscribers from db", skip(self))]
    async fn list_by_newsletter(
        &self,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Subscriber>, SubscriberError> {
        let query = format!(
            "SELECT {} FROM subscribers WHERE newsletter_id = $1 ORDER BY subscribed_at",
            SUBSCRIBER_COLUMNS
        );
        let rows = sqlx::query_as::<_, SubscriberRow>(&query)
            .bind(newsletter_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list subscribers")?;

        rows.into_iter().map(Subscriber::try_from).collect()
    }

    #[tracing::instrument(name = "Get confirmed subscribers", skip(self))]
    async fn list_confirmed(
        &self,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Result<ConfirmedSubscriber, SubscriberError>>, SubscriberError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT email FROM subscribers
            WHERE newsletter_id = $1 AND is_confirmed = true AND unsubscribed_at IS NULL"#,
        )
        .bind(newsletter_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch confirmed subscribers")?;

        Ok(rows
            .into_iter()
            .map(|(email,)| {
                SubscriberEmail::parse(email)
                    .map(ConfirmedSubscriber::from_email)
                    .map_err(SubscriberError::from)
            })
            .collect())
    }
}
