//! Chart series
//!
//! The dashboard draws two charts from a summary, sales per hour of day and
//! units sold for the best items, plus a stock level chart from the
//! inventory. Only the data is produced here; styling belongs to whatever
//! renders it.

use super::AnalyticsSummary;
use serde::Serialize;

/// Default number of bars in the top items chart
pub const DEFAULT_TOP_ITEMS: usize = 5;

/// A labeled data series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    /// Dataset label
    pub label: String,
    /// One label per point
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest value in the series, 0 when empty
    pub fn max_value(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Iterate `(label, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Sales count for each hour 0-23, labeled `H:00`
pub fn hourly_series(summary: &AnalyticsSummary) -> ChartSeries {
    ChartSeries {
        label: "Sales by Hour".to_string(),
        labels: (0..24).map(|h| format!("{}:00", h)).collect(),
        values: summary.hourly_buckets().to_vec(),
    }
}

/// Best `limit` items by units sold, descending; ties ordered by name
pub fn top_items_series(summary: &AnalyticsSummary, limit: usize) -> ChartSeries {
    let mut items: Vec<(&String, u64)> = summary
        .items_sold
        .iter()
        .map(|(name, qty)| (name, *qty))
        .collect();
    // items_sold iterates by name, so a stable sort settles ties alphabetically
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items.truncate(limit);

    ChartSeries {
        label: "Units Sold".to_string(),
        labels: items.iter().map(|(name, _)| (*name).clone()).collect(),
        values: items.iter().map(|(_, qty)| *qty).collect(),
    }
}

/// Items still in stock, most units first; ties ordered by name
pub fn stock_series<'a, I>(levels: I) -> ChartSeries
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut levels: Vec<(&str, u64)> = levels.into_iter().filter(|(_, qty)| *qty > 0).collect();
    levels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ChartSeries {
        label: "Quantity in Stock".to_string(),
        labels: levels.iter().map(|(name, _)| name.to_string()).collect(),
        values: levels.iter().map(|(_, qty)| *qty).collect(),
    }
}
