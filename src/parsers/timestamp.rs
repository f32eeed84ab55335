use chrono::{DateTime, Duration, Utc};
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

/// 1601-01-01T00:00:00Z expressed as Unix seconds.
const WEBKIT_EPOCH_UNIX_SECONDS: i64 = -11_644_473_600;

/// How a family stores its last-visit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampEncoding {
    /// Microseconds since 1601-01-01 UTC (Chromium `urls.last_visit_time`).
    Webkit,
    /// Microseconds since 1970-01-01 UTC (Firefox `moz_places.last_visit_date`).
    Unix,
}

impl TimestampEncoding {
    pub fn epoch(self) -> Option<DateTime<Utc>> {
        match self {
            TimestampEncoding::Webkit => {
                DateTime::<Utc>::from_timestamp(WEBKIT_EPOCH_UNIX_SECONDS, 0)
            }
            TimestampEncoding::Unix => DateTime::<Utc>::from_timestamp(0, 0),
        }
    }

    /// Zero and negative values are "never visited" sentinels.
    pub fn decode(self, microseconds: i64) -> Option<DateTime<Utc>> {
        if microseconds <= 0 {
            return None;
        }
        self.epoch()?
            .checked_add_signed(Duration::microseconds(microseconds))
    }

    /// Decode a raw SQLite cell. Anything that is not an integer-like value
    /// comes back as `None`.
    pub fn decode_value(self, value: ValueRef<'_>) -> Option<DateTime<Utc>> {
        raw_microseconds(value).and_then(|v| self.decode(v))
    }
}

fn raw_microseconds(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(v) => Some(v),
        ValueRef::Real(v) => {
            if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                Some(v as i64)
            } else {
                None
            }
        }
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}
