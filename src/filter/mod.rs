//! Sale record filters
//!
//! Filters are predicates over a single [`SaleRecord`]. Selecting through a
//! filter keeps the surviving records in their input order and never
//! fabricates or copies records.
//!
//! - [`TimeWindowFilter`]: named relative date ranges (today/week/month/year/all)
//! - [`TextSearchFilter`]: case-insensitive substring search on name and id

mod text_search;
mod time_window;

pub use text_search::TextSearchFilter;
pub use time_window::{ParseWindowError, TimeWindow, TimeWindowFilter};

use crate::sales::SaleRecord;

/// A predicate over sale records
pub trait SaleFilter {
    /// Check if a record passes this filter
    fn matches(&self, record: &SaleRecord) -> bool;

    /// Keep the matching records, preserving input order
    fn select<'a, I>(&self, records: I) -> Vec<&'a SaleRecord>
    where
        I: IntoIterator<Item = &'a SaleRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
