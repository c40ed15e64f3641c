// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for clocks and date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a Unix millisecond timestamp the way `X-RateLimit-Reset` expects
/// (ISO-8601, millisecond precision, `Z` suffix).
///
/// Out-of-range values fall back to the Unix epoch.
pub fn format_unix_millis(millis: u64) -> String {
    let date = i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default();
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as Unix seconds.
pub fn now_unix_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Current time as Unix milliseconds.
pub fn now_unix_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Current time as stored in `created_at` / `updated_at` fields.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_unix_millis() {
        assert_eq!(format_unix_millis(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            format_unix_millis(1_700_000_000_123),
            "2023-11-14T22:13:20.123Z"
        );
    }

    #[test]
    fn test_format_utc_rfc3339_uses_z_suffix() {
        let date = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2023-11-14T22:13:20Z");
    }
}
