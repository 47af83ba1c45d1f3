//! Timestamp utilities
//!
//! The store keeps every timestamp as integer Unix epoch milliseconds.

use chrono::{DateTime, Duration, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a timestamp to its stored form (epoch milliseconds)
pub fn to_millis(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

/// Convert stored epoch milliseconds back to a UTC timestamp
pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::Internal(format!("Timestamp out of range: {}", millis)))
}

/// Start of the trailing window of `days` days ending at `as_of`
pub fn window_start(as_of: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    as_of - Duration::days(days)
}
