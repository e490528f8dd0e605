//! review-watch HTTP clients
//!
//! Concrete collaborators for the poll loop:
//! - [`PracticumClient`] fetches homework statuses from the review API.
//! - [`TelegramChannel`] delivers notifications through the Telegram Bot API.

use std::time::Duration;

use review_watch_core::WatchError;
use thiserror::Error;

mod http;
mod practicum;
mod telegram;


pub use practicum::PracticumClient;
pub use telegram::TelegramChannel;

/// Timeout applied to every outgoing request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by the HTTP clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("server returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// Telegram accepted the request but refused to deliver the message.
    #[error("message rejected: {description}")]
    Rejected {
        /// Reason given by the Bot API.
        description: String,
    },
}

impl ClientError {
    /// Maps this error onto the fetch-side variants of [`WatchError`].
    #[must_use]
    pub fn into_fetch_error(self) -> WatchError {
        match self {
            Self::Status { status, .. } => WatchError::BadResponseStatus { status },
            Self::Decode(message) => WatchError::invalid_body(message),
            other @ (Self::Build(_) | Self::Transport(_) | Self::Rejected { .. }) => {
                WatchError::endpoint_unreachable(other.to_string())
            }
        }
    }

    /// Maps this error onto [`WatchError::NotificationDelivery`].
    #[must_use]
    pub fn into_delivery_error(self) -> WatchError {
        WatchError::notification_delivery(self.to_string())
    }
}

/// Builds the shared `reqwest` client used by both collaborators.
fn build_http_client() -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("review-watch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ClientError::Build)
}
