use super::PostgresDb;
use crate::domain::{
    editor::EditorId,
    newsletter::models::newsletter::NewsletterId,
    post::{
        errors::PostError,
        models::{
            post::{Post, PostId},
            status::PostStatus,
            timeline::Timeline,
        },
        ports::{PostRepository, StatusTransition},
    },
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, newsletter_id, editor_id, title, content_html, content_text, \
     status, scheduled_at, published_at, created_at";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    newsletter_id: Uuid,
    editor_id: Uuid,
    title: String,
    content_html: String,
    content_text: Option<String>,
    status: String,
    scheduled_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = PostError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status = PostStatus::parse(&row.status)?;
        let timeline = Timeline::restore(status, row.scheduled_at, row.published_at)
            .map_err(|e| anyhow::anyhow!("Post {} has an invalid timeline: {}", row.id, e))?;
        Ok(Self {
            id: row.id,
            newsletter_id: row.newsletter_id,
            editor_id: EditorId::new(row.editor_id),
            title: row.title,
            content_html: row.content_html,
            content_text: row.content_text,
            timeline,
            created_at: row.created_at,
        })
    }
}

fn into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, PostError> {
    rows.into_iter().map(Post::try_from).collect()
}

fn not_found(post_id: PostId) -> PostError {
    PostError::NotFound(format!("Post {} does not exist", post_id))
}

#[async_trait]
impl PostRepository for PostgresDb {
    #[tracing::instrument(name = "List newsletter posts from db", skip(self))]
    async fn find_by_newsletter(
        &self,
        newsletter_id: NewsletterId,
        published: Option<bool>,
    ) -> Result<Vec<Post>, PostError> {
        let filter = match published {
            Some(true) => " AND published_at IS NOT NULL",
            Some(false) => " AND published_at IS NULL",
            None => "",
        };
        let query = format!(
            "SELECT {} FROM published_posts WHERE newsletter_id = $1{} ORDER BY created_at DESC",
            POST_COLUMNS, filter
        );
        let rows = sqlx::query_as::<_, PostRow>(&query)
            .bind(newsletter_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        into_posts(rows)
    }

    #[tracing::instrument(name = "Fetch post from db", skip(self))]
    async fn find_by_id(&self, post_id: PostId) -> Result<Post, PostError> {
        let query = format!("SELECT {} FROM published_posts WHERE id = $1", POST_COLUMNS);
        let row = sqlx::query_as::<_, PostRow>(&query)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch post")?;

        row.ok_or_else(|| not_found(post_id))?.try_into()
    }

    #[tracing::instrument(name = "Fetch due posts from db", level = "debug", skip(self))]
    async fn find_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Post>, PostError> {
        let query = format!(
            "SELECT {} FROM published_posts \
             WHERE status = $1 AND scheduled_at <= $2 AND published_at IS NULL \
             ORDER BY scheduled_at",
            POST_COLUMNS
        );
        let rows = sqlx::query_as::<_, PostRow>(&query)
            .bind(PostStatus::Scheduled.as_str())
            .bind(as_of)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch due posts")?;

        into_posts(rows)
    }

    #[tracing::instrument(name = "Saving new post in db", skip(self, post), fields(post_id = %post.id))]
    async fn insert(&self, post: &Post) -> Result<(), PostError> {
        let query = format!(
            "INSERT INTO published_posts ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            POST_COLUMNS
        );
        sqlx::query(&query)
            .bind(post.id)
            .bind(post.newsletter_id)
            .bind(post.editor_id.as_uuid())
            .bind(&post.title)
            .bind(&post.content_html)
            .bind(&post.content_text)
            .bind(post.status().as_str())
            .bind(post.timeline.scheduled_at())
            .bind(post.timeline.published_at())
            .bind(post.created_at)
            .execute(&self.pool)
            .await
            .context("Failed to insert post")?;
        Ok(())
    }

    #[tracing::instrument(name = "Updating post in db", skip(self, post), fields(post_id = %post.id))]
    async fn update(&self, post: &Post) -> Result<(), PostError> {
        // A row that is already POSTED keeps its status and timestamps.
        let result = sqlx::query(
            r#"UPDATE published_posts
            SET title = $2, content_html = $3, content_text = $4,
                scheduled_at = CASE WHEN status = $8 THEN scheduled_at ELSE $6 END,
                published_at = CASE WHEN status = $8 THEN published_at ELSE $7 END,
                status = CASE WHEN status = $8 THEN status ELSE $5 END
            WHERE id = $1"#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content_html)
        .bind(&post.content_text)
        .bind(post.status().as_str())
        .bind(post.timeline.scheduled_at())
        .bind(post.timeline.published_at())
        .bind(PostStatus::Posted.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        if result.rows_affected() == 0 {
            return Err(not_found(post.id));
        }
        Ok(())
    }

    #[tracing::instrument(name = "Mark post as published", skip(self))]
    async fn mark_published(
        &self,
        post_id: PostId,
        published_at: DateTime<Utc>,
    ) -> Result<StatusTransition, PostError> {
        let result = sqlx::query(
            r#"UPDATE published_posts SET status = $2, published_at = $3
            WHERE id = $1 AND status = $4"#,
        )
        .bind(post_id)
        .bind(PostStatus::Posted.as_str())
        .bind(published_at)
        .bind(PostStatus::Scheduled.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to mark post as published")?;

        if result.rows_affected() > 0 {
            return Ok(StatusTransition::Applied);
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM published_posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up post after a no-op publish")?;
        match exists {
            Some(_) => Ok(StatusTransition::AlreadyPosted),
            None => Err(not_found(post_id)),
        }
    }

    #[tracing::instrument(name = "Delete post from db", skip(self))]
    async fn delete(&self, post_id: PostId) -> Result<(), PostError> {
        let result = sqlx::query("DELETE FROM published_posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;

        if result.rows_affected() == 0 {
            return Err(not_found(post_id));
        }
        Ok(())
    }
}
