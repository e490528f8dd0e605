//! The fixed status vocabulary of the review API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Review status of a homework submission.
///
/// Only these three values are recognized; anything else the API sends is a
/// data-integrity error, not a new status to pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    /// The reviewer accepted the work.
    Approved,
    /// A reviewer has picked the work up.
    Reviewing,
    /// The reviewer sent the work back with remarks.
    Rejected,
}

impl HomeworkStatus {
    /// Parses the wire value of a status. Matching is exact.
    ///
    /// # Examples
    ///
    /// ```
    /// use review_watch_core::HomeworkStatus;
    ///
    /// assert_eq!(HomeworkStatus::from_wire("approved"), Some(HomeworkStatus::Approved));
    /// assert_eq!(HomeworkStatus::from_wire("Approved"), None);
    /// ```
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns the wire value of this status.
    #[must_use]
    pub const fn as_wire(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Returns the human-readable verdict sentence sent to the user.
    #[must_use]
    pub const fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
