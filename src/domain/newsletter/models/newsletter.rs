use crate::domain::editor::EditorId;
use crate::domain::newsletter::errors::NewsletterError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

pub type NewsletterId = Uuid;

#[derive(Deserialize, Debug)]
pub struct NewsletterRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Newsletter {
    pub id: NewsletterId,
    pub editor_id: EditorId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
pub struct NewsletterName(String);

impl NewsletterName {
    const MAX_LENGTH: usize = 100;

    pub fn parse(name: String) -> Result<NewsletterName, String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Err("Newsletter name cannot be empty".to_string())
        } else if trimmed.graphemes(true).count() > NewsletterName::MAX_LENGTH {
            Err(format!(
                "Newsletter name must be at most {} characters",
                NewsletterName::MAX_LENGTH
            ))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl AsRef<str> for NewsletterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, PartialEq)]
pub struct NewsletterDescription(String);

impl NewsletterDescription {
    const MAX_LENGTH: usize = 500;

    pub fn parse(description: String) -> Result<NewsletterDescription, String> {
        if description.graphemes(true).count() > NewsletterDescription::MAX_LENGTH {
            Err(format!(
                "Description must be at most {} characters",
                NewsletterDescription::MAX_LENGTH
            ))
        } else {
            Ok(Self(description))
        }
    }
}

impl Newsletter {
    pub fn create(
        editor_id: EditorId,
        request: NewsletterRequest,
        now: DateTime<Utc>,
    ) -> Result<Newsletter, NewsletterError> {
        let name = NewsletterName::parse(request.name).map_err(NewsletterError::ValidationError)?;
        let description = request
            .description
            .map(NewsletterDescription::parse)
            .transpose()
            .map_err(NewsletterError::ValidationError)?;

        Ok(Self {
            id: Uuid::new_v4(),
            editor_id,
            name: name.0,
            description: description.map(|d| d.0),
            created_at: now,
            updated_at: now,
        })
    }

    /// Ownership is the authorization boundary for everything hanging off a newsletter.
    pub fn ensure_owned_by(&self, editor_id: EditorId) -> Result<(), NewsletterError> {
        if self.editor_id == editor_id {
            Ok(())
        } else {
            Err(NewsletterError::Forbidden(format!(
                "Editor {} does not own newsletter {}",
                editor_id, self.id
            )))
        }
    }

    /// Subject line for a post sent out by this newsletter.
    pub fn subject_for(&self, post_title: &str) -> String {
        if self.name.is_empty() {
            post_title.to_string()
        } else {
            format!("{}: {}", self.name, post_title)
        }
    }
}
