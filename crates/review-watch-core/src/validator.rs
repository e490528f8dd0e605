//! Structural validation of homework API responses.

use serde_json::Value;
use tracing::error;

use crate::error::{json_type_name, Result, WatchError};

/// Checks the shape of a decoded API response and returns its homeworks.
///
/// The response must be a mapping with a `homeworks` key holding a list.
/// Individual records are returned untouched; the extractor checks them.
///
/// # Examples
///
/// ```
/// use review_watch_core::validate_response;
/// use serde_json::json;
///
/// let body = json!({"homeworks": [{"status": "approved"}], "current_date": 1});
/// assert_eq!(validate_response(&body).map(<[_]>::len).ok(), Some(1));
/// assert!(validate_response(&json!([])).is_err());
/// ```
pub fn validate_response(response: &Value) -> Result<&[Value]> {
    let Some(mapping) = response.as_object() else {
        let found = json_type_name(response);
        error!(found, "API response is not a mapping");
        return Err(WatchError::NotAMapping { found });
    };

    let Some(homeworks) = mapping.get("homeworks") else {
        error!("API response has no 'homeworks' key");
        return Err(WatchError::MissingHomeworksKey);
    };

    match homeworks.as_array() {
        Some(list) => Ok(list.as_slice()),
        None => {
            let found = json_type_name(homeworks);
            error!(found, "API response 'homeworks' is not a list");
            Err(WatchError::HomeworksNotASequence { found })
        }
    }
}
