use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum PostStatusError {
    #[error("Unknown post status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    Scheduled,
    Posted,
}

impl PostStatus {
    const SCHEDULED: &'static str = "SCHEDULED";
    const POSTED: &'static str = "POSTED";

    pub fn parse(status: &str) -> Result<PostStatus, PostStatusError> {
        match status {
            Self::SCHEDULED => Ok(PostStatus::Scheduled),
            Self::POSTED => Ok(PostStatus::Posted),
            _ => Err(PostStatusError::UnknownStatus(status.into())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Scheduled => Self::SCHEDULED,
            PostStatus::Posted => Self::POSTED,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
