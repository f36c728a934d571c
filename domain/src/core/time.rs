//! Timestamps (milliseconds since the Unix epoch).

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
