//! Shared helpers for integration tests.

pub mod fixtures;

use chrono::{DateTime, Utc};

/// Fixed reference time so due dates are reproducible.
pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-09-02T09:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}
