//! Configuration for review-watch.
//!
//! Credentials come from the environment; everything else is a fixed
//! constant or an explicit startup parameter in [`LoopSettings`].

use std::fmt;
use std::time::Duration;

use tracing::error;

use crate::error::{Result, WatchError};
use crate::state::PollCursor;

/// Homework status endpoint of the review API.
pub const ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Base URL of the Telegram Bot API.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Seconds to sleep between two poll ticks.
pub const RETRY_PERIOD_SECS: u64 = 600;

/// Environment variable holding the review API token.
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the destination chat id.
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// The three secrets the watcher needs before it may start.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token for the homework review API.
    pub practicum_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Telegram chat that receives notifications.
    pub telegram_chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

impl Credentials {
    /// Loads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::MissingCredentials` naming every variable that is
    /// unset or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads credentials through an arbitrary variable lookup.
    ///
    /// Each missing variable is logged at error level before the combined
    /// error is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut fetch = |name: &'static str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                error!(variable = name, "Required credential is not set");
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let practicum_token = fetch(PRACTICUM_TOKEN_VAR);
        let telegram_token = fetch(TELEGRAM_TOKEN_VAR);
        let telegram_chat_id = fetch(TELEGRAM_CHAT_ID_VAR);

        if !missing.is_empty() {
            return Err(WatchError::MissingCredentials { names: missing });
        }

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
        })
    }
}

/// Where the cursor starts when the process boots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorStart {
    /// Start at the current wall-clock time: only changes from now on.
    #[default]
    Now,
    /// Start at a fixed Unix timestamp.
    At(i64),
}

impl CursorStart {
    /// Resolves this start point into a concrete cursor.
    #[must_use]
    pub fn resolve(self) -> PollCursor {
        match self {
            Self::Now => PollCursor::now(),
            Self::At(timestamp) => PollCursor::new(timestamp),
        }
    }
}

/// Runtime knobs of the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    /// Sleep between two ticks.
    pub retry_period: Duration,
    /// Whether tick failures are also pushed through the notification channel.
    pub report_failures: bool,
    /// Initial cursor.
    pub cursor_start: CursorStart,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            retry_period: Duration::from_secs(RETRY_PERIOD_SECS),
            report_failures: false,
            cursor_start: CursorStart::default(),
        }
    }
}

impl LoopSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::ConfigValidation` if the retry period is zero or
    /// the fixed start timestamp is negative.
    pub fn validate(&self) -> Result<()> {
        if self.retry_period.is_zero() {
            return Err(WatchError::config_validation(
                "retry period must be greater than 0",
                "Use a retry period of at least 1 second",
            ));
        }

        if let CursorStart::At(timestamp) = self.cursor_start {
            if timestamp < 0 {
                return Err(WatchError::config_validation(
                    format!("start timestamp {timestamp} is negative"),
                    "Pass a Unix timestamp of 0 or later to --from-date",
                ));
            }
        }

        Ok(())
    }
}
