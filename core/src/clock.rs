//! Report clock — the single "now" every age computation reads.
//!
//! RULE: No analyzer may read the system time directly.
//! Two reports built with the same fixed clock over the same table
//! must serialize to identical insight bags.

use crate::types::Days;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReportClock {
    pub now:   NaiveDateTime,
    pub fixed: bool,
}

impl ReportClock {
    /// Pin "now" to a known instant. Used by tests and reproducible runs.
    pub fn fixed(now: NaiveDateTime) -> Self {
        Self { now, fixed: true }
    }

    /// Read the wall clock once, in UTC.
    pub fn system() -> Self {
        Self { now: Utc::now().naive_utc(), fixed: false }
    }

    /// Fractional days elapsed between `since` and now.
    /// Negative when `since` lies in the future.
    pub fn days_since(&self, since: NaiveDateTime) -> Days {
        days_between(since, self.now)
    }

    /// Whole days elapsed, truncated toward zero.
    pub fn whole_days_since(&self, since: NaiveDateTime) -> i64 {
        (self.now - since).num_days()
    }
}

/// Fractional days from `start` to `end`.
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> Days {
    let delta = end - start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0 / SECONDS_PER_DAY,
        None     => delta.num_seconds() as f64 / SECONDS_PER_DAY,
    }
}
