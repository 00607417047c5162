// SPDX-License-Identifier: MIT

//! Shared helpers for epoch-millis timestamps.

use chrono::{TimeZone, Utc};

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format epoch milliseconds as a short display date ("15 Jan 2024").
pub fn format_millis(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%d %b %Y").to_string(),
        None => "N/A".to_string(),
    }
}
