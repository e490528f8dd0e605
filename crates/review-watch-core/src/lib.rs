//! review-watch core
//!
//! Polls a homework review API, detects when the status of the most recent
//! submission changes and forwards a notification through a messaging
//! channel.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod extractor;
pub mod poll_loop;
pub mod state;
pub mod validator;
pub mod verdict;

pub use collaborators::{HomeworkApi, NotificationChannel};
pub use config::{
    Credentials, CursorStart, LoopSettings, ENDPOINT, PRACTICUM_TOKEN_VAR, RETRY_PERIOD_SECS,
    TELEGRAM_API_BASE, TELEGRAM_CHAT_ID_VAR, TELEGRAM_TOKEN_VAR,
};
pub use error::{ErrorCategory, Result, WatchError};
pub use extractor::{extract_notification, format_notification};
pub use poll_loop::{PollLoop, TickOutcome, FAILURE_PREFIX};
pub use state::{PollCursor, WatchState};
pub use validator::validate_response;
pub use verdict::HomeworkStatus;
