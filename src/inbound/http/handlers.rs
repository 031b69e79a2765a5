pub mod confirm;
pub mod health_check;
pub mod newsletters;
pub mod posts;
pub mod subscribe;
pub mod subscribers;
pub mod unsubscribe;

pub use confirm::confirm;
pub use health_check::health_check;
pub use newsletters::{create_newsletter, get_newsletter, list_newsletters};
pub use posts::{create_post, delete_post, get_post, list_posts, publish_post, update_post};
pub use subscribe::subscribe;
pub use subscribers::list_subscribers;
pub use unsubscribe::unsubscribe;
