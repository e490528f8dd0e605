//! Error types for the review-watch core.
//!
//! Every fallible step of a poll tick returns a specific [`WatchError`]
//! variant. [`WatchError::category`] groups the variants into the handful of
//! [`ErrorCategory`] buckets the poll loop reacts to.

use std::fmt;

/// A specialized `Result` type for review-watch operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while watching homework review statuses.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    // ========================================================================
    // Startup Errors
    // ========================================================================
    /// One or more required credentials are absent from the environment.
    #[error("Missing required credentials: {}\n\nSuggestion: Set them in the environment or in a .env file", .names.join(", "))]
    MissingCredentials {
        /// Environment variable names that were missing or blank.
        names: Vec<&'static str>,
    },

    /// Loop settings failed validation.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Fetch Errors
    // ========================================================================
    /// The homework API could not be reached at all.
    #[error("Homework API endpoint unreachable: {message}")]
    EndpointUnreachable {
        /// Transport-level failure description.
        message: String,
    },

    /// The homework API answered with a non-success status code.
    #[error("Homework API returned status {status}")]
    BadResponseStatus {
        /// HTTP status code returned by the API.
        status: u16,
    },

    /// The response body could not be decoded as JSON.
    #[error("Homework API returned an undecodable body: {message}")]
    InvalidBody {
        /// Decoder failure description.
        message: String,
    },

    // ========================================================================
    // Response Shape Errors
    // ========================================================================
    /// The response body is not a JSON object.
    #[error("API response is not a mapping (got {found})")]
    NotAMapping {
        /// JSON type name of the value actually received.
        found: &'static str,
    },

    /// The response object has no `homeworks` key.
    #[error("API response has no 'homeworks' key")]
    MissingHomeworksKey,

    /// The `homeworks` value is not a JSON array.
    #[error("API response 'homeworks' is not a list (got {found})")]
    HomeworksNotASequence {
        /// JSON type name of the value actually received.
        found: &'static str,
    },

    // ========================================================================
    // Homework Record Errors
    // ========================================================================
    /// The homework record has no `status` key.
    #[error("Homework record has no 'status'")]
    MissingStatus,

    /// The homework record carries a status outside the known vocabulary.
    #[error("Unknown homework status '{status}'")]
    UnknownStatus {
        /// The status as received, rendered as text.
        status: String,
    },

    /// The homework record has no `homework_name` key.
    #[error("Homework record has no 'homework_name'")]
    MissingName,

    // ========================================================================
    // Delivery Errors
    // ========================================================================
    /// The notification channel failed to deliver a message.
    #[error("Failed to deliver notification: {message}")]
    NotificationDelivery {
        /// Channel failure description.
        message: String,
    },
}

/// How the poll loop treats an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The process cannot start.
    StartupFatal,
    /// The current tick failed; the next tick proceeds normally.
    TickRecoverable,
    /// A change was detected but the user was not told about it.
    DeliveryFailure,
    /// Anything the loop has no specific handling for.
    Unexpected,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartupFatal => write!(f, "startup_fatal"),
            Self::TickRecoverable => write!(f, "tick_recoverable"),
            Self::DeliveryFailure => write!(f, "delivery_failure"),
            Self::Unexpected => write!(f, "unexpected"),
        }
    }
}

impl WatchError {
    /// Creates a new `ConfigValidation` error with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `EndpointUnreachable` error.
    #[must_use]
    pub fn endpoint_unreachable(message: impl Into<String>) -> Self {
        Self::EndpointUnreachable {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidBody` error.
    #[must_use]
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::InvalidBody {
            message: message.into(),
        }
    }

    /// Creates a new `UnknownStatus` error.
    #[must_use]
    pub fn unknown_status(status: impl Into<String>) -> Self {
        Self::UnknownStatus {
            status: status.into(),
        }
    }

    /// Creates a new `NotificationDelivery` error.
    #[must_use]
    pub fn notification_delivery(message: impl Into<String>) -> Self {
        Self::NotificationDelivery {
            message: message.into(),
        }
    }

    /// Returns the category the poll loop uses to decide how to react.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredentials { .. } | Self::ConfigValidation { .. } => {
                ErrorCategory::StartupFatal
            }
            Self::EndpointUnreachable { .. }
            | Self::BadResponseStatus { .. }
            | Self::NotAMapping { .. }
            | Self::MissingHomeworksKey
            | Self::HomeworksNotASequence { .. }
            | Self::MissingStatus
            | Self::UnknownStatus { .. }
            | Self::MissingName => ErrorCategory::TickRecoverable,
            Self::NotificationDelivery { .. } => ErrorCategory::DeliveryFailure,
            Self::InvalidBody { .. } => ErrorCategory::Unexpected,
        }
    }

    /// Returns `true` if this error must stop the process before the loop starts.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.category(), ErrorCategory::StartupFatal)
    }
}

/// Returns the JSON type name of a value, for diagnostics.
pub(crate) const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "mapping",
    }
}
