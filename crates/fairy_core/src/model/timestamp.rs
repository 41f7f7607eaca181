//! Epoch-millisecond timestamps used across storage and exports.

use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Formats epoch milliseconds as ISO-8601 UTC with a `Z` suffix.
///
/// Out-of-range values fall back to the raw number so rendering never fails.
pub fn format_epoch_ms(epoch_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
        Some(value) => value.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => epoch_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::format_epoch_ms;

    #[test]
    fn format_uses_utc_z_suffix() {
        assert_eq!(format_epoch_ms(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_epoch_ms(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }
}
