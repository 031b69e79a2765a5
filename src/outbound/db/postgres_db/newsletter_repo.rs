use super::PostgresDb;
use crate::domain::{
    editor::EditorId,
    newsletter::{
        errors::NewsletterError,
        models::newsletter::{Newsletter, NewsletterId},
        ports::NewsletterRepository,
    },
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct NewsletterRow {
    id: Uuid,
    editor_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NewsletterRow> for Newsletter {
    fn from(row: NewsletterRow) -> Self {
        Self {
            id: row.id,
            editor_id: EditorId::new(row.editor_id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl NewsletterRepository for PostgresDb {
    #[tracing::instrument(name = "Fetch newsletter from db", skip(self))]
    async fn get(&self, newsletter_id: NewsletterId) -> Result<Newsletter, NewsletterError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"SELECT id, editor_id, name, description, created_at, updated_at
            FROM newsletters WHERE id = $1"#,
        )
        .bind(newsletter_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch newsletter")?;

        row.map(Newsletter::from).ok_or_else(|| {
            NewsletterError::NotFound(format!("Newsletter {} does not exist", newsletter_id))
        })
    }

    #[tracing::instrument(name = "Saving new newsletter in db", skip(self, newsletter))]
    async fn insert(&self, newsletter: &Newsletter) -> Result<(), NewsletterError> {
        sqlx::query(
            r#"INSERT INTO newsletters (id, editor_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(newsletter.id)
        .bind(newsletter.editor_id.as_uuid())
        .bind(&newsletter.name)
        .bind(&newsletter.description)
        .bind(newsletter.created_at)
        .bind(newsletter.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert newsletter")?;
        Ok(())
    }

    #[tracing::instrument(name = "List editor newsletters from db", skip(self))]
    async fn list_by_editor(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<Newsletter>, NewsletterError> {
        let rows = sqlx::query_as::<_, NewsletterRow>(
            r#"SELECT id, editor_id, name, description, created_at, updated_at
            FROM newsletters WHERE editor_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(editor_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list newsletters")?;

        Ok(rows.into_iter().map(Newsletter::from).collect())
    }
}
