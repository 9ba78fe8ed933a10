// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! The ledger buckets completions into calendar days in a configured fixed
//! offset (the "reference time zone"). All helpers take the instant and the
//! offset explicitly so tests can pin arbitrary times.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, SecondsFormat, Timelike, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build a `FixedOffset` from minutes east of UTC.
///
/// Values outside chrono's valid range fall back to UTC; `Config` rejects
/// them before we get here.
pub fn ledger_offset(offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Calendar date of an instant in the ledger's reference time zone.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// `YYYY-MM-DD` ledger date key for an instant.
pub fn date_key(now: DateTime<Utc>, offset: FixedOffset) -> String {
    local_date(now, offset).format("%Y-%m-%d").to_string()
}

/// Wall-clock time of day of an instant in the ledger's reference time zone.
pub fn local_time(now: DateTime<Utc>, offset: FixedOffset) -> NaiveTime {
    now.with_timezone(&offset).time()
}

/// Time of day as fractional hours (e.g. 05:30 -> 5.5).
///
/// Seconds are ignored, matching how bonus windows are defined.
pub fn hour_fraction(time: NaiveTime) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0
}

/// Parse a `YYYY-MM-DD` date key.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}
