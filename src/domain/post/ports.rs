use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    editor::EditorId,
    newsletter::models::newsletter::NewsletterId,
    post::{
        errors::PostError,
        models::post::{Post, PostId, PostRequest},
    },
};

/// Outcome of the guarded `Scheduled -> Posted` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Applied,
    AlreadyPosted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Publication {
    Published(Post),
    AlreadyPublished,
}

#[async_trait]
/// Store of newsletter posts
pub trait PostRepository: Send + Sync + 'static {
    /// Posts of a newsletter. `Some(true)` keeps posted ones, `Some(false)` scheduled ones.
    async fn find_by_newsletter(
        &self,
        newsletter_id: NewsletterId,
        published: Option<bool>,
    ) -> Result<Vec<Post>, PostError>;

    async fn find_by_id(&self, post_id: PostId) -> Result<Post, PostError>;

    /// Scheduled posts whose send time is at or before `as_of`
    async fn find_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Post>, PostError>;

    async fn insert(&self, post: &Post) -> Result<(), PostError>;

    /// Persist edited content and schedule. A stored post that is already posted keeps
    /// its status and timestamps whatever `post` carries.
    async fn update(&self, post: &Post) -> Result<(), PostError>;

    /// Move a scheduled post to posted. `NotFound` when the row does not exist.
    async fn mark_published(
        &self,
        post_id: PostId,
        published_at: DateTime<Utc>,
    ) -> Result<StatusTransition, PostError>;

    /// `NotFound` when no row was deleted
    async fn delete(&self, post_id: PostId) -> Result<(), PostError>;
}

#[async_trait]
pub trait PostService: Send + Sync + 'static {
    async fn create_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        request: PostRequest,
    ) -> Result<Post, PostError>;

    async fn update_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
        request: PostRequest,
    ) -> Result<Post, PostError>;

    async fn delete_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> Result<(), PostError>;

    async fn get_post(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> Result<Post, PostError>;

    async fn list_posts(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        published: Option<bool>,
    ) -> Result<Vec<Post>, PostError>;

    /// Transition a post to posted and mail it to the confirmed subscribers.
    /// Delivery failures are logged, never returned.
    async fn publish(&self, post_id: PostId) -> Result<Publication, PostError>;

    /// Editor-triggered publication of one of their posts.
    async fn publish_now(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
        post_id: PostId,
    ) -> Result<Post, PostError>;

    async fn due_posts(&self, as_of: DateTime<Utc>) -> Result<Vec<Post>, PostError>;
}
