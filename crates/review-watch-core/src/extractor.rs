//! Turns the most recent homework record into a notification.

use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Result, WatchError};
use crate::verdict::HomeworkStatus;

/// Formats the notification sent when a homework changes status.
#[must_use]
pub fn format_notification(homework_name: &str, status: HomeworkStatus) -> String {
    format!(
        "Изменился статус проверки работы \"{homework_name}\". {}",
        status.verdict()
    )
}

/// Extracts a notification from a homework record.
///
/// Returns `Ok(None)` when the status equals `previous`, meaning there is
/// nothing new to tell. Otherwise `previous` is updated to the new status and
/// the formatted message is returned.
///
/// `previous` is only touched once the record has passed every check.
pub fn extract_notification(
    record: &Value,
    previous: &mut Option<HomeworkStatus>,
) -> Result<Option<String>> {
    let Some(raw_status) = record.get("status") else {
        error!("Homework record has no 'status'");
        return Err(WatchError::MissingStatus);
    };

    let status = raw_status
        .as_str()
        .and_then(HomeworkStatus::from_wire)
        .ok_or_else(|| {
            let shown = raw_status
                .as_str()
                .map_or_else(|| raw_status.to_string(), str::to_string);
            error!(status = %shown, "Homework record has an unknown status");
            WatchError::unknown_status(shown)
        })?;

    let Some(homework_name) = record.get("homework_name").and_then(Value::as_str) else {
        error!("Homework record has no 'homework_name'");
        return Err(WatchError::MissingName);
    };

    if *previous == Some(status) {
        debug!(%status, homework_name, "Status unchanged");
        return Ok(None);
    }

    *previous = Some(status);
    Ok(Some(format_notification(homework_name, status)))
}
