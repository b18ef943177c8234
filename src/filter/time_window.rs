//! Relative time windows
//!
//! All boundaries are computed in the server's local wall-clock, the same
//! clock `created_at` is expressed in. Weeks start on Sunday.

use super::SaleFilter;
use crate::sales::SaleRecord;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Named relative date range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// No restriction
    #[default]
    All,
    /// Same calendar day as the reference time
    Today,
    /// Since the most recent Sunday, 00:00
    Week,
    /// Since the first of the reference month, 00:00
    Month,
    /// Since January 1 of the reference year, 00:00
    Year,
}

impl TimeWindow {
    /// Get all windows for iteration
    pub fn all() -> &'static [TimeWindow] {
        &[
            TimeWindow::All,
            TimeWindow::Today,
            TimeWindow::Week,
            TimeWindow::Month,
            TimeWindow::Year,
        ]
    }

    /// Parse a UI token, falling back to `All` for anything unknown
    pub fn from_token(token: &str) -> Self {
        token.parse().unwrap_or(TimeWindow::All)
    }

    /// Start of this window relative to `now` (inclusive), `None` for `All`
    pub fn start(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let today = now.date();
        let first_day = match self {
            Self::All => return None,
            Self::Today => today,
            Self::Week => {
                let days_since_sunday = today.weekday().num_days_from_sunday() as i64;
                today - Duration::days(days_since_sunday)
            }
            Self::Month => today.with_day(1)?,
            Self::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
        };
        first_day.and_hms_opt(0, 0, 0)
    }

    /// Check whether a timestamp falls inside this window
    pub fn contains(&self, at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Today => at.date() == now.date(),
            _ => self.start(now).map(|start| at >= start).unwrap_or(true),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Today => write!(f, "today"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
        }
    }
}

/// Error for an unknown window token in strict parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown time window: {0} (expected all, today, week, month or year)")]
pub struct ParseWindowError(pub String);

impl FromStr for TimeWindow {
    type Err = ParseWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" | "day" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(ParseWindowError(other.to_string())),
        }
    }
}

/// Filter keeping records inside a time window around a reference time
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowFilter {
    pub window: TimeWindow,
    pub reference_now: NaiveDateTime,
}

impl TimeWindowFilter {
    pub fn new(window: TimeWindow, reference_now: NaiveDateTime) -> Self {
        Self {
            window,
            reference_now,
        }
    }
}

impl SaleFilter for TimeWindowFilter {
    fn matches(&self, record: &SaleRecord) -> bool {
        if self.window == TimeWindow::All {
            return true;
        }
        match record.created_at {
            Some(at) => self.window.contains(at, self.reference_now),
            None => {
                tracing::trace!(id = record.id, "sale without readable timestamp skipped");
                false
            }
        }
    }
}
