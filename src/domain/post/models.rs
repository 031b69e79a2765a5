pub mod post;
pub mod status;
pub mod timeline;
