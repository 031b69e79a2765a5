use super::status::PostStatus;
use chrono::{DateTime, Utc};

/// Publication state of a post.
///
/// Fields are private so that `published_at` is set if and only if the status is
/// `Posted`, and once set is never moved or cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    status: PostStatus,
    scheduled_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
}

impl Timeline {
    /// Timeline for a post requested to go out at `send_at`. A send time that is
    /// already due publishes immediately at `now`.
    pub fn schedule(send_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if send_at <= now {
            Self {
                status: PostStatus::Posted,
                scheduled_at: Some(send_at),
                published_at: Some(now),
            }
        } else {
            Self {
                status: PostStatus::Scheduled,
                scheduled_at: Some(send_at),
                published_at: None,
            }
        }
    }

    /// Scheduled for `send_at` regardless of the clock.
    pub fn pending(send_at: DateTime<Utc>) -> Self {
        Self {
            status: PostStatus::Scheduled,
            scheduled_at: Some(send_at),
            published_at: None,
        }
    }

    /// Same rule as [`Timeline::schedule`], except a posted timeline is kept as is.
    pub fn reschedule(&self, send_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if self.is_posted() {
            *self
        } else {
            Self::schedule(send_at, now)
        }
    }

    /// Rebuild a timeline from stored columns.
    pub fn restore(
        status: PostStatus,
        scheduled_at: Option<DateTime<Utc>>,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Self, String> {
        match (status, published_at) {
            (PostStatus::Posted, Some(_)) | (PostStatus::Scheduled, None) => Ok(Self {
                status,
                scheduled_at,
                published_at,
            }),
            (PostStatus::Posted, None) => {
                Err("Posted post is missing its publication time".to_string())
            }
            (PostStatus::Scheduled, Some(_)) => {
                Err("Scheduled post already carries a publication time".to_string())
            }
        }
    }

    pub fn is_posted(&self) -> bool {
        self.status == PostStatus::Posted
    }

    pub fn status(&self) -> PostStatus {
        self.status
    }

    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
}
