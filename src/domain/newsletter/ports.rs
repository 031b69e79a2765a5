use async_trait::async_trait;

use crate::domain::{
    editor::EditorId,
    newsletter::{
        errors::NewsletterError,
        models::newsletter::{Newsletter, NewsletterId, NewsletterRequest},
    },
};

#[async_trait]
/// Store of newsletter records
pub trait NewsletterRepository: Send + Sync + 'static {
    /// Fetch a newsletter, `NotFound` if there is no such row
    async fn get(&self, newsletter_id: NewsletterId) -> Result<Newsletter, NewsletterError>;

    async fn insert(&self, newsletter: &Newsletter) -> Result<(), NewsletterError>;

    /// Newsletters owned by the editor, newest first
    async fn list_by_editor(&self, editor_id: EditorId)
        -> Result<Vec<Newsletter>, NewsletterError>;
}

#[async_trait]
pub trait NewsletterService: Send + Sync + 'static {
    async fn create_newsletter(
        &self,
        editor_id: EditorId,
        request: NewsletterRequest,
    ) -> Result<Newsletter, NewsletterError>;

    async fn list_newsletters(&self, editor_id: EditorId)
        -> Result<Vec<Newsletter>, NewsletterError>;

    async fn get_newsletter(
        &self,
        editor_id: EditorId,
        newsletter_id: NewsletterId,
    ) -> Result<Newsletter, NewsletterError>;
}
