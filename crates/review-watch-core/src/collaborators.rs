//! Seams to the outside world.
//!
//! The poll loop only knows these two traits. Real HTTP implementations live
//! in the `review-watch-clients` crate; tests use in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::state::PollCursor;

/// Source of homework review statuses.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetches every status change since `cursor` and returns the decoded body.
    ///
    /// Implementations map transport failures to
    /// `WatchError::EndpointUnreachable`, non-success statuses to
    /// `WatchError::BadResponseStatus` and undecodable bodies to
    /// `WatchError::InvalidBody`.
    async fn fetch(&self, cursor: PollCursor) -> Result<Value>;
}

/// Destination for user-facing messages.
///
/// A channel is bound to a single recipient when it is built.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers `text`, or fails with `WatchError::NotificationDelivery`.
    async fn send(&self, text: &str) -> Result<()>;
}
