// Optional time filter -> concrete inclusive [from, to] window.

use chrono::{DateTime, Utc};

use crate::error::{StoreError, StoreResult};
use crate::models::{TimeFilter, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn from_nanos(&self) -> i64 {
        nanos_saturating(self.from)
    }

    pub fn to_nanos(&self) -> i64 {
        nanos_saturating(self.to)
    }
}

/// Missing bounds default to the epoch and to now.
pub fn resolve(filter: Option<&TimeFilter>) -> StoreResult<TimeWindow> {
    resolve_at(filter, Utc::now())
}

/// `resolve` with the clock reading supplied by the caller.
pub fn resolve_at(filter: Option<&TimeFilter>, now: DateTime<Utc>) -> StoreResult<TimeWindow> {
    let mut window = TimeWindow {
        from: DateTime::UNIX_EPOCH,
        to: now,
    };
    let Some(filter) = filter else {
        return Ok(window);
    };
    if let Some(from) = filter.from {
        window.from = bound(from, "from")?;
    }
    if let Some(to) = filter.to {
        window.to = bound(to, "to")?;
    }
    Ok(window)
}

fn bound(ts: Timestamp, name: &str) -> StoreResult<DateTime<Utc>> {
    ts.to_unix_nanos()
        .map(DateTime::from_timestamp_nanos)
        .ok_or_else(|| {
            StoreError::InvalidTimestamp(format!(
                "{name}: seconds={} nanos={}",
                ts.seconds, ts.nanos
            ))
        })
}

fn nanos_saturating(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_nanos_opt()
        .unwrap_or(if dt.timestamp() < 0 { i64::MIN } else { i64::MAX })
}
