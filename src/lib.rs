//! # Laku
//!
//! Sales dashboard core for a small shop: filters a snapshot of sale records
//! by time window and search text, aggregates revenue and item statistics,
//! and renders the table page, summary cards and chart series a dashboard
//! shows. Sales and inventory items can be recorded through the backend, and
//! an assistant chat channel can report actions; both trigger targeted data
//! refreshes.
//!
//! ## Modules
//!
//! - [`sales`]: Sale and inventory records with lenient wire decoding
//! - [`filter`]: Time window and text search filters
//! - [`analytics`]: Aggregation and chart series
//! - [`view`]: Table paging, summary cards and display formatting
//! - [`source`]: REST backend and snapshot file sources, sale and item writes
//! - [`chat`]: Assistant replies and action dispatch
//! - [`controller`]: Owner of the dashboard state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use laku::{DashboardController, FileSource, TimeWindow};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut dashboard = DashboardController::new(FileSource::new("sales.json"));
//!     dashboard.refresh_all().await;
//!
//!     dashboard.set_window(TimeWindow::Week);
//!     dashboard.set_query("tea");
//!
//!     let render = dashboard.render_now();
//!     println!("{} matching sales", render.page.matched);
//!     println!("Revenue: {}", render.summary.cards.total_revenue);
//! }
//! ```

pub mod analytics;
pub mod chat;
pub mod config;
pub mod controller;
pub mod filter;
pub mod sales;
pub mod source;
pub mod view;

// Re-export top-level types for convenience
pub use sales::{parse_timestamp, InventoryItem, SaleRecord};

pub use filter::{ParseWindowError, SaleFilter, TextSearchFilter, TimeWindow, TimeWindowFilter};

pub use analytics::{
    hourly_series, stock_series, summarize, top_items_series, AnalyticsSummary, ChartSeries,
    RecentSale, SalesAggregator,
};

pub use view::{
    DashboardSummary, ParseSummaryModeError, SaleRow, SalesPage, SalesRender, SalesView,
    SummaryCards, SummaryMode,
};

pub use source::{
    FileSource, HttpSource, HttpSourceConfig, NewItem, NewSale, SalesSource, SnapshotFormat,
    SourceError, SourceResult, WriteReceipt,
};

pub use chat::{
    ActionDispatcher, ChatAction, ChatReply, ChatSummary, DispatchReport, RefreshHandler,
    RefreshOp,
};

pub use controller::{ChatOutcome, DashboardController, FilterState, WriteOutcome};

pub use config::{Config, ConfigError, LoggingConfig, SourceConfig, SourceKind, ViewConfig};
