pub mod auth;
pub mod editor;
pub mod newsletter;
pub mod notifier;
pub mod post;
pub mod subscriber;
