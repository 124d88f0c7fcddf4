use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::settings::DEFAULT_FILENAME_PREFIX;

/// `{prefix}-{timestamp}.jpg`, where the timestamp is ISO 8601 UTC with millisecond precision
/// and every `:` and `.` replaced by `-`, e.g. `photobooth-2026-10-14T12-34-56-789Z.jpg`.
///
/// A blank prefix falls back to `photobooth`; path separators in the prefix become `-`.
pub fn artifact_filename(prefix: &str, at: DateTime<Utc>) -> String {
    let prefix = prefix.trim();
    let prefix = if prefix.is_empty() {
        DEFAULT_FILENAME_PREFIX
    } else {
        prefix
    };
    let prefix: String = prefix
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{prefix}-{stamp}.jpg")
}
