//! Sales analytics
//!
//! - [`SalesAggregator`]: reduces sale records into an [`AnalyticsSummary`]
//! - [`ChartSeries`]: labeled series handed to the chart renderer, built from
//!   a summary or from stock levels

mod aggregator;
mod charts;

pub use aggregator::{summarize, AnalyticsSummary, RecentSale, SalesAggregator, DEFAULT_RECENT_LIMIT};
pub use charts::{hourly_series, stock_series, top_items_series, ChartSeries, DEFAULT_TOP_ITEMS};
