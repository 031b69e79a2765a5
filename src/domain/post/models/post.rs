use super::{status::PostStatus, timeline::Timeline};
use crate::domain::editor::EditorId;
use crate::domain::newsletter::models::newsletter::NewsletterId;
use crate::domain::post::errors::PostError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

pub type PostId = Uuid;

#[derive(Deserialize, Debug, Clone)]
pub struct PostRequest {
    pub title: String,
    pub content_html: String,
    pub content_text: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq)]
pub struct PostTitle(String);

impl PostTitle {
    const MAX_LENGTH: usize = 200;

    pub fn parse(title: String) -> Result<PostTitle, String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            Err("Title is required".to_string())
        } else if trimmed.graphemes(true).count() > PostTitle::MAX_LENGTH {
            Err(format!(
                "Title must be at most {} characters",
                PostTitle::MAX_LENGTH
            ))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, PartialEq)]
pub struct PostBody<B> {
    body: String,
    _marker: std::marker::PhantomData<B>,
}

#[derive(Debug, PartialEq)]
pub struct HtmlBody;

#[derive(Debug, PartialEq)]
pub struct TextBody;

impl<B> PostBody<B> {
    pub fn new(body: String) -> Result<Self, String> {
        if body.trim().is_empty() {
            return Err("Post body cannot be empty".to_string());
        }
        Ok(Self {
            body,
            _marker: std::marker::PhantomData,
        })
    }

    pub fn into_inner(self) -> String {
        self.body
    }
}

impl<B> AsRef<str> for PostBody<B> {
    fn as_ref(&self) -> &str {
        &self.body
    }
}

/// A validated create/update request.
#[derive(Debug)]
pub struct PostDraft {
    pub title: PostTitle,
    pub html: PostBody<HtmlBody>,
    pub text: Option<PostBody<TextBody>>,
    pub send_at: DateTime<Utc>,
}

impl TryFrom<PostRequest> for PostDraft {
    type Error = PostError;

    fn try_from(request: PostRequest) -> Result<Self, Self::Error> {
        let title = PostTitle::parse(request.title).map_err(PostError::ValidationError)?;
        let html =
            PostBody::<HtmlBody>::new(request.content_html).map_err(PostError::ValidationError)?;
        // A blank plain-text part is treated as absent.
        let text = request
            .content_text
            .filter(|text| !text.trim().is_empty())
            .map(PostBody::<TextBody>::new)
            .transpose()
            .map_err(PostError::ValidationError)?;
        let send_at = request
            .scheduled_at
            .ok_or_else(|| PostError::ValidationError("ScheduledAt is required".to_string()))?;

        Ok(Self {
            title,
            html,
            text,
            send_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub newsletter_id: NewsletterId,
    pub editor_id: EditorId,
    pub title: String,
    pub content_html: String,
    pub content_text: Option<String>,
    pub timeline: Timeline,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn create(
        newsletter_id: NewsletterId,
        editor_id: EditorId,
        draft: PostDraft,
        now: DateTime<Utc>,
    ) -> Post {
        Self {
            id: Uuid::new_v4(),
            newsletter_id,
            editor_id,
            timeline: Timeline::schedule(draft.send_at, now),
            title: draft.title.0,
            content_html: draft.html.into_inner(),
            content_text: draft.text.map(PostBody::into_inner),
            created_at: now,
        }
    }

    /// Apply an editor update. Identity, ownership and an existing publication are kept.
    pub fn revise(&self, draft: PostDraft, now: DateTime<Utc>) -> Post {
        Self {
            id: self.id,
            newsletter_id: self.newsletter_id,
            editor_id: self.editor_id,
            timeline: self.timeline.reschedule(draft.send_at, now),
            title: draft.title.0,
            content_html: draft.html.into_inner(),
            content_text: draft.text.map(PostBody::into_inner),
            created_at: self.created_at,
        }
    }

    pub fn belongs_to(&self, newsletter_id: NewsletterId) -> Result<(), PostError> {
        if self.newsletter_id == newsletter_id {
            Ok(())
        } else {
            Err(PostError::Forbidden(format!(
                "Post {} does not belong to newsletter {}",
                self.id, newsletter_id
            )))
        }
    }

    pub fn status(&self) -> PostStatus {
        self.timeline.status()
    }

    pub fn is_posted(&self) -> bool {
        self.timeline.is_posted()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDto {
    pub id: PostId,
    pub newsletter_id: NewsletterId,
    pub editor_id: EditorId,
    pub title: String,
    pub content_html: String,
    pub content_text: Option<String>,
    pub status: PostStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            newsletter_id: post.newsletter_id,
            editor_id: post.editor_id,
            title: post.title.clone(),
            content_html: post.content_html.clone(),
            content_text: post.content_text.clone(),
            status: post.timeline.status(),
            scheduled_at: post.timeline.scheduled_at(),
            published_at: post.timeline.published_at(),
            created_at: post.created_at,
        }
    }
}
