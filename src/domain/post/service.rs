use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::{
    editor::EditorId,
    newsletter::{
        models::newsletter::NewsletterId, ports::NewsletterRepository, service::owned_newsletter,
    },
    notifier::{MailDispatcher, MailMessage},
    post::{
        errors::PostError,
        models::{
            post::{Post, PostDraft, PostId, PostRequest},
            timeline::Timeline,
        },
        ports::{PostRepository, PostService, Publication, StatusTransition},
    },
    subscriber::ports::SubscriberRepository,
};

#[derive(Debug, Clone)]
pub struct BlogPosts<P, N, S, M>
where
    P: PostRepository,
    N: NewsletterRepository,
    S: SubscriberRepository,
    M: MailDispatcher,
{
    pub posts: Arc<P>,
    pub newsletters: Arc<N>,
    pub subscribers: Arc<S>,
    pub mailer: Arc<M>,
}

impl<P, N, S, M> BlogPosts<P, N, S, M>
where
    P: PostRepository,
    N: NewsletterRepository,
    S: SubscriberRepository,
    M: MailDispatcher,
{
    pub fn new(posts: Arc<P>, newsletters: Arc<N>, subscribers: Arc<S>, mailer: Arc<M>) -> Self {
        Self {
            posts,
            newsletters,
            subscribers,
            mailer,
        }
    }

    /// Load a post after checking the editor owns `newsletter_id` and the post lives in it.
    async fn owned_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> Result<Post, PostError> {
        owned_newsletter(self.newsletters.as_ref(), newsletter_id, editor_id).await?;
        let post = self.posts.find_by_id(post_id).await?;
        post.belongs_to(newsletter_id)?;
        Ok(post)
    }

    /// Mail a freshly posted post. Failures end up in the logs only.
    async fn fan_out(&self, post: &Post) {
        match self.deliver(post).await {
            Ok(0) => {}
            Ok(recipients) => {
                tracing::info!(post_id = %post.id, recipients, "Post delivered to subscribers");
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    post_id = %post.id,
                    "Failed to deliver post to subscribers"
                );
            }
        }
    }

    #[tracing::instrument(
        name = "Deliver a post to confirmed subscribers",
        skip(self, post),
        fields(post_id = %post.id, newsletter_id = %post.newsletter_id)
    )]
    async fn deliver(&self, post: &Post) -> Result<usize, anyhow::Error> {
        let newsletter = self
            .newsletters
            .get(post.newsletter_id)
            .await
            .context("Failed to resolve the newsletter of a published post")?;
        let confirmed = self
            .subscribers
            .list_confirmed(post.newsletter_id)
            .await
            .context("Failed to list confirmed subscribers")?;

        let mut recipients = Vec::with_capacity(confirmed.len());
        for subscriber in confirmed {
            match subscriber {
                Ok(subscriber) => recipients.push(subscriber.email().clone()),
                Err(error) => {
                    tracing::warn!(
                        error.cause_chain = ?error,
                        "Skipping a confirmed subscriber. Their stored contact details are invalid",
                    );
                }
            }
        }

        if recipients.is_empty() {
            tracing::info!("No confirmed subscribers for newsletter");
            return Ok(0);
        }

        let message = MailMessage::new(
            newsletter.subject_for(&post.title),
            post.content_html.clone(),
            post.content_text.clone(),
        )
        .context("Post cannot be turned into an email")?;

        self.mailer
            .send(&recipients, &message)
            .await
            .context("Failed to send newsletter email")?;
        Ok(recipients.len())
    }
}

#[async_trait]
impl<P, N, S, M> PostService for BlogPosts<P, N, S, M>
where
    P: PostRepository,
    N: NewsletterRepository,
    S: SubscriberRepository,
    M: MailDispatcher,
{
    #[tracing::instrument(
        name = "Create a post",
        skip(self, request),
        fields(post_id = tracing::field::Empty)
    )]
    async fn create_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        request: PostRequest,
    ) -> Result<Post, PostError> {
        owned_newsletter(self.newsletters.as_ref(), newsletter_id, editor_id).await?;
        let draft = PostDraft::try_from(request)?;

        let post = Post::create(newsletter_id, editor_id, draft, Utc::now());
        tracing::Span::current().record("post_id", tracing::field::display(&post.id));
        self.posts.insert(&post).await?;

        if post.is_posted() {
            self.fan_out(&post).await;
        }
        Ok(post)
    }

    #[tracing::instrument(name = "Update a post", skip(self, request))]
    async fn update_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
        request: PostRequest,
    ) -> Result<Post, PostError> {
        let existing = self.owned_post(editor_id, newsletter_id, post_id).await?;
        let draft = PostDraft::try_from(request)?;
        let revised = existing.revise(draft, Utc::now());

        if existing.is_posted() || !revised.is_posted() {
            self.posts.update(&revised).await?;
            return Ok(revised);
        }

        // Newly due: store the edit as still scheduled so the transition goes
        // through the guarded update and mail goes out at most once.
        let send_at = revised
            .timeline
            .scheduled_at()
            .unwrap_or(revised.created_at);
        let staged = Post {
            timeline: Timeline::pending(send_at),
            ..revised
        };
        self.posts.update(&staged).await?;
        match self.publish(post_id).await? {
            Publication::Published(post) => Ok(post),
            Publication::AlreadyPublished => self.posts.find_by_id(post_id).await,
        }
    }

    #[tracing::instrument(name = "Delete a post", skip(self))]
    async fn delete_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> Result<(), PostError> {
        self.owned_post(editor_id, newsletter_id, post_id).await?;
        self.posts.delete(post_id).await?;
        tracing::info!("Post deleted");
        Ok(())
    }

    #[tracing::instrument(name = "Get a post", skip(self))]
    async fn get_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> Result<Post, PostError> {
        self.owned_post(editor_id, newsletter_id, post_id).await
    }

    #[tracing::instrument(name = "List posts of a newsletter", skip(self))]
    async fn list_posts(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        published: Option<bool>,
    ) -> Result<Vec<Post>, PostError> {
        owned_newsletter(self.newsletters.as_ref(), newsletter_id, editor_id).await?;
        self.posts.find_by_newsletter(newsletter_id, published).await
    }

    #[tracing::instrument(name = "Publish a post", skip(self))]
    async fn publish(&self, post_id: PostId) -> Result<Publication, PostError> {
        match self.posts.mark_published(post_id, Utc::now()).await? {
            StatusTransition::Applied => {}
            StatusTransition::AlreadyPosted => {
                tracing::info!("Post was already published, skipping delivery");
                return Ok(Publication::AlreadyPublished);
            }
        }

        let post = self.posts.find_by_id(post_id).await?;
        self.fan_out(&post).await;
        Ok(Publication::Published(post))
    }

    #[tracing::instrument(name = "Publish a post on editor request", skip(self))]
    async fn publish_now(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> Result<Post, PostError> {
        self.owned_post(editor_id, newsletter_id, post_id).await?;
        match self.publish(post_id).await? {
            Publication::Published(post) => Ok(post),
            Publication::AlreadyPublished => self.posts.find_by_id(post_id).await,
        }
    }

    async fn due_posts(&self, as_of: DateTime<Utc>) -> Result<Vec<Post>, PostError> {
        self.posts.find_due(as_of).await
    }
}
