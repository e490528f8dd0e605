//! Loop-owned state of the watcher.
//!
//! Everything that survives from one tick to the next lives in
//! [`WatchState`]. Nothing here is persisted; a restart starts over.

use std::fmt;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::verdict::HomeworkStatus;

// ============================================================================
// PollCursor
// ============================================================================

/// Unix timestamp marking the start of the next fetch window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollCursor(i64);

impl PollCursor {
    /// Creates a cursor at the given Unix timestamp.
    #[must_use]
    pub const fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Creates a cursor at the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Returns the raw timestamp.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PollCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// WatchState
// ============================================================================

/// State carried across ticks by the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    /// Lower bound of the next fetch.
    pub cursor: PollCursor,
    /// Last status the user was notified about.
    pub previous_status: Option<HomeworkStatus>,
    /// Text of the last failure report pushed to the channel.
    pub last_failure: Option<String>,
}

impl WatchState {
    /// Creates a fresh state starting at `cursor`.
    #[must_use]
    pub const fn new(cursor: PollCursor) -> Self {
        Self {
            cursor,
            previous_status: None,
            last_failure: None,
        }
    }

    /// Moves the cursor to the `current_date` of a fetched body, if any.
    ///
    /// The cursor never moves backwards. Returns `true` if it moved.
    pub fn advance_cursor(&mut self, body: &Value) -> bool {
        let Some(raw) = body.get("current_date") else {
            return false;
        };

        let Some(next) = raw.as_i64() else {
            warn!(current_date = %raw, "Ignoring non-integer current_date");
            return false;
        };

        if next < self.cursor.value() {
            warn!(
                cursor = self.cursor.value(),
                current_date = next,
                "Ignoring current_date older than the cursor"
            );
            return false;
        }

        if next != self.cursor.value() {
            debug!(from = self.cursor.value(), to = next, "Cursor advanced");
        }
        self.cursor = PollCursor::new(next);
        true
    }
}
