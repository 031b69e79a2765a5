use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    editor::EditorId,
    newsletter::{
        errors::NewsletterError,
        models::newsletter::{Newsletter, NewsletterId, NewsletterRequest},
        ports::{NewsletterRepository, NewsletterService},
    },
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BlogNewsletters<R>
where
    R: NewsletterRepository,
{
    pub repo: Arc<R>,
}

impl<R> BlogNewsletters<R>
where
    R: NewsletterRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

/// Resolve a newsletter and check the caller owns it.
#[tracing::instrument(name = "Check newsletter ownership", skip(repo))]
pub async fn owned_newsletter<R: NewsletterRepository + ?Sized>(
    repo: &R,
    newsletter_id: NewsletterId,
    editor_id: EditorId,
) -> Result<Newsletter, NewsletterError> {
    let newsletter = repo.get(newsletter_id).await?;
    newsletter.ensure_owned_by(editor_id)?;
    Ok(newsletter)
}

#[async_trait]
impl<R> NewsletterService for BlogNewsletters<R>
where
    R: NewsletterRepository,
{
    #[tracing::instrument(name = "Create a newsletter", skip(self, request))]
    async fn create_newsletter(
        &self,
        editor_id: EditorId,
        request: NewsletterRequest,
    ) -> Result<Newsletter, NewsletterError> {
        let newsletter = Newsletter::create(editor_id, request, Utc::now())?;
        self.repo.insert(&newsletter).await?;
        tracing::info!(newsletter_id = %newsletter.id, "Newsletter created");
        Ok(newsletter)
    }

    #[tracing::instrument(name = "List newsletters of an editor", skip(self))]
    async fn list_newsletters(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<Newsletter>, NewsletterError> {
        self.repo.list_by_editor(editor_id).await
    }

    #[tracing::instrument(name = "Get a newsletter", skip(self))]
    async fn get_newsletter(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
    ) -> Result<Newsletter, NewsletterError> {
        owned_newsletter(self.repo.as_ref(), newsletter_id, editor_id).await
    }
}
