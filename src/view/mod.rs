//! Dashboard view models
//!
//! Turns a sales snapshot plus the current filter state into the rows and
//! statistics the dashboard shows. Nothing here touches the network or
//! produces markup.
//!
//! ```text
//! all records → TimeWindowFilter → TextSearchFilter → first page → table
//!                                                   ↘
//! server summary | SalesAggregator (per SummaryMode) → cards + charts
//! ```

pub mod format;
mod sales_view;

pub use sales_view::{
    DashboardSummary, ParseSummaryModeError, SaleRow, SalesPage, SalesRender, SalesView,
    SummaryCards, SummaryMode, DEFAULT_PAGE_SIZE,
};
