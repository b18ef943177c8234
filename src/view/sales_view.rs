//! The sales table and summary panel

use super::format::{format_currency, format_date, units_sold_label};
use crate::analytics::{
    hourly_series, top_items_series, AnalyticsSummary, ChartSeries, SalesAggregator,
    DEFAULT_TOP_ITEMS,
};
use crate::filter::{SaleFilter, TextSearchFilter, TimeWindow, TimeWindowFilter};
use crate::sales::SaleRecord;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rows shown in the sales table
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Where the summary cards and charts get their numbers from
///
/// The table always follows the active window and query. Whether the cards
/// should follow them too is a product decision, so it is configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Use the separately fetched server summary, covering every sale
    #[default]
    Server,
    /// Aggregate the whole local snapshot, ignoring window and query
    Snapshot,
    /// Aggregate only the records visible under the window and query
    Filtered,
}

impl std::fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Snapshot => write!(f, "snapshot"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Error returned when a summary mode token is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown summary mode: {0} (expected server, snapshot or filtered)")]
pub struct ParseSummaryModeError(pub String);

impl FromStr for SummaryMode {
    type Err = ParseSummaryModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "snapshot" | "local" => Ok(Self::Snapshot),
            "filtered" => Ok(Self::Filtered),
            other => Err(ParseSummaryModeError(other.to_string())),
        }
    }
}

/// One row of the sales table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRow {
    pub id: u64,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub created_at: Option<NaiveDateTime>,
    pub price_label: String,
    pub total_label: String,
    pub date_label: String,
}

impl SaleRow {
    pub fn from_record(record: &SaleRecord) -> Self {
        let line_total = record.line_total();
        Self {
            id: record.id,
            item_name: record.item_name.clone(),
            quantity: record.quantity,
            unit_price: record.price,
            line_total,
            created_at: record.created_at,
            price_label: format_currency(record.price),
            total_label: format_currency(line_total),
            date_label: format_date(record.created_at),
        }
    }
}

/// The visible page of the sales table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPage {
    /// At most one page of rows, in snapshot order
    pub rows: Vec<SaleRow>,
    /// Records passing window and query
    pub matched: usize,
    /// Records in the snapshot
    pub total: usize,
    /// "Showing N of M sales", only when the snapshot exceeds one page
    pub note: Option<String>,
    /// Message for an empty table
    pub empty_message: Option<String>,
}

/// Text of the four summary cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCards {
    pub total_revenue: String,
    pub total_sales: u64,
    pub avg_order_value: String,
    /// Best selling item, `-` when there is none
    pub top_item: String,
    pub top_item_units: String,
}

impl SummaryCards {
    pub fn from_summary(summary: &AnalyticsSummary) -> Self {
        let (top_item, top_item_units) = match &summary.best_selling_item {
            Some(item) if !item.is_empty() => (
                item.clone(),
                units_sold_label(summary.best_selling_quantity),
            ),
            _ => ("-".to_string(), units_sold_label(0)),
        };

        Self {
            total_revenue: format_currency(summary.total_revenue),
            total_sales: summary.total_sales_count,
            avg_order_value: format_currency(summary.avg_order_value),
            top_item,
            top_item_units,
        }
    }
}

/// Summary panel: the numbers plus what the cards and charts show
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub mode: SummaryMode,
    pub analytics: AnalyticsSummary,
    pub cards: SummaryCards,
    pub hourly_chart: ChartSeries,
    pub top_items_chart: ChartSeries,
}

/// Everything one render pass produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRender {
    pub page: SalesPage,
    pub summary: DashboardSummary,
}

/// Composes the filters and the aggregator into what the dashboard renders
#[derive(Debug, Clone)]
pub struct SalesView {
    page_size: usize,
    summary_mode: SummaryMode,
    top_items: usize,
    aggregator: SalesAggregator,
}

impl Default for SalesView {
    fn default() -> Self {
        Self::new()
    }
}

impl SalesView {
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            summary_mode: SummaryMode::default(),
            top_items: DEFAULT_TOP_ITEMS,
            aggregator: SalesAggregator::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_summary_mode(mut self, mode: SummaryMode) -> Self {
        self.summary_mode = mode;
        self
    }

    pub fn with_top_items(mut self, top_items: usize) -> Self {
        self.top_items = top_items;
        self
    }

    pub fn with_aggregator(mut self, aggregator: SalesAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn summary_mode(&self) -> SummaryMode {
        self.summary_mode
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Records passing the window, then the query, in snapshot order
    pub fn visible<'a>(
        &self,
        all: &'a [SaleRecord],
        window: TimeWindow,
        query: &str,
        now: NaiveDateTime,
    ) -> Vec<&'a SaleRecord> {
        let in_window = TimeWindowFilter::new(window, now).select(all);
        TextSearchFilter::new(query).select(in_window)
    }

    /// Produce the table page and the summary panel for one render cycle
    ///
    /// `server_summary` is the separately fetched analytics object; it is only
    /// consulted in [`SummaryMode::Server`], where a missing one renders as an
    /// empty summary.
    pub fn render(
        &self,
        all: &[SaleRecord],
        window: TimeWindow,
        query: &str,
        now: NaiveDateTime,
        server_summary: Option<&AnalyticsSummary>,
    ) -> SalesRender {
        let visible = self.visible(all, window, query, now);
        let page = self.page(all.len(), &visible, query);

        let analytics = match self.summary_mode {
            SummaryMode::Server => match server_summary {
                Some(summary) => summary.clone(),
                None => {
                    tracing::debug!("no server summary yet, rendering empty cards");
                    AnalyticsSummary::default()
                }
            },
            SummaryMode::Snapshot => self.aggregator.summarize(all),
            SummaryMode::Filtered => self.aggregator.summarize(visible.iter().copied()),
        };

        SalesRender {
            page,
            summary: self.summary_panel(analytics),
        }
    }

    fn page(&self, total: usize, visible: &[&SaleRecord], query: &str) -> SalesPage {
        let rows: Vec<SaleRow> = visible
            .iter()
            .take(self.page_size)
            .map(|record| SaleRow::from_record(record))
            .collect();

        let note = if total > self.page_size {
            Some(format!("Showing {} of {} sales", rows.len(), total))
        } else {
            None
        };

        let empty_message = if !visible.is_empty() {
            None
        } else if query.trim().is_empty() {
            Some("No sales found for the selected period".to_string())
        } else {
            Some(format!("No sales found matching \"{}\"", query))
        };

        SalesPage {
            rows,
            matched: visible.len(),
            total,
            note,
            empty_message,
        }
    }

    fn summary_panel(&self, analytics: AnalyticsSummary) -> DashboardSummary {
        DashboardSummary {
            mode: self.summary_mode,
            cards: SummaryCards::from_summary(&analytics),
            hourly_chart: hourly_series(&analytics),
            top_items_chart: top_items_series(&analytics, self.top_items),
            analytics,
        }
    }
}
