use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::{
    editor::EditorId,
    newsletter::{
        models::newsletter::{Newsletter, NewsletterId},
        ports::NewsletterRepository,
        service::owned_newsletter,
    },
    notifier::{MailDispatcher, MailMessage},
    subscriber::{
        errors::SubscriberError,
        models::{
            subscriber::{SubscribeRequest, Subscriber},
            token::SubscriptionToken,
        },
        ports::{SubscriberRepository, SubscriptionService},
    },
};

#[derive(Debug, Clone)]
pub struct Subscription<R, N, M>
where
    R: SubscriberRepository,
    N: NewsletterRepository,
    M: MailDispatcher,
{
    pub repo: Arc<R>,
    pub newsletters: Arc<N>,
    pub mailer: Arc<M>,
    base_url: String,
}

impl<R, N, M> Subscription<R, N, M>
where
    R: SubscriberRepository,
    N: NewsletterRepository,
    M: MailDispatcher,
{
    pub fn new(repo: Arc<R>, newsletters: Arc<N>, mailer: Arc<M>, base_url: &str) -> Self {
        Self {
            repo,
            newsletters,
            mailer,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn confirmation_link(&self, token: &SubscriptionToken) -> String {
        format!(
            "{}/api/v1/subscribe/confirm/{}",
            self.base_url,
            token.as_ref()
        )
    }

    #[tracing::instrument(
        name = "Send a confirmation email to a new subscriber",
        skip(self, newsletter, subscriber)
    )]
    async fn send_confirmation(
        &self,
        newsletter: &Newsletter,
        subscriber: &Subscriber,
    ) -> Result<(), anyhow::Error> {
        let link = self.confirmation_link(&subscriber.confirmation_token);
        let message = MailMessage::new(
            format!("Confirm your subscription to {}", newsletter.name),
            format!(
                "Welcome to {}!<br />Click <a href=\"{}\">here</a> to confirm your subscription.",
                newsletter.name, link
            ),
            Some(format!(
                "Welcome to {}!\nVisit {} to confirm your subscription.",
                newsletter.name, link
            )),
        )
        .context("Failed to build the confirmation email")?;

        self.mailer
            .send(std::slice::from_ref(&subscriber.email), &message)
            .await
            .context("Failed to send the confirmation email")?;
        Ok(())
    }
}

fn parse_token(token: String) -> Result<SubscriptionToken, SubscriberError> {
    SubscriptionToken::parse(token).map_err(SubscriberError::ValidationError)
}

#[async_trait]
impl<R, N, M> SubscriptionService for Subscription<R, N, M>
where
    R: SubscriberRepository,
    N: NewsletterRepository,
    M: MailDispatcher,
{
    #[tracing::instrument(
        name = "Adding a new subscriber",
        skip(self, request),
        fields(subscriber_email = %request.email)
    )]
    async fn subscribe(
        &self,
        newsletter_id: NewsletterId,
        request: SubscribeRequest,
    ) -> Result<Subscriber, SubscriberError> {
        let newsletter = self.newsletters.get(newsletter_id).await?;
        let subscriber = Subscriber::new(newsletter.id, request, Utc::now())?;
        self.repo.insert(&subscriber).await?;

        if let Err(e) = self.send_confirmation(&newsletter, &subscriber).await {
            tracing::error!(
                error.cause_chain = ?e,
                subscriber_id = %subscriber.id,
                "Failed to send a confirmation email"
            );
        }
        Ok(subscriber)
    }

    #[tracing::instrument(name = "Confirm a pending subscriber", skip(self, token))]
    async fn confirm(&self, token: String) -> Result<Subscriber, SubscriberError> {
        let token = parse_token(token)?;
        let subscriber = self.repo.confirm_by_token(&token).await?;
        tracing::info!(subscriber_id = %subscriber.id, "Subscriber confirmed");
        Ok(subscriber)
    }

    #[tracing::instrument(name = "Unsubscribe a subscriber", skip(self, token))]
    async fn unsubscribe(&self, token: String) -> Result<Subscriber, SubscriberError> {
        let token = parse_token(token)?;
        let subscriber = self.repo.unsubscribe_by_token(&token, Utc::now()).await?;
        tracing::info!(subscriber_id = %subscriber.id, "Subscriber unsubscribed");
        Ok(subscriber)
    }

    #[tracing::instrument(name = "List subscribers of a newsletter", skip(self))]
    async fn list_subscribers(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
    ) -> Result<Vec<Subscriber>, SubscriberError> {
        owned_newsletter(self.newsletters.as_ref(), newsletter_id, editor_id).await?;
        self.repo.list_by_newsletter(newsletter_id).await
    }
}
