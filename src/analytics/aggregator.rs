//! Sales aggregation
//!
//! Reduces a snapshot of sale records into an [`AnalyticsSummary`]. Every
//! pass is a full recompute; nothing is cached between calls.
//!
//! # Degraded records
//!
//! - missing price or quantity already decode as zero and simply add nothing
//! - a line total or revenue sum beyond the `Decimal` range adds nothing to
//!   `total_revenue`; the record still counts as a sale
//! - records without a readable `created_at` count towards every total but
//!   are left out of `hourly_sales` and `recent_sales`

use crate::sales::{lenient, SaleRecord};
use chrono::Timelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default number of entries in `recent_sales`
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Aggregate statistics over a set of sale records
///
/// The same shape is returned by the backend's analytics endpoint, so the
/// fields decode leniently and all default to their empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Sum of line totals
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_revenue: Decimal,
    /// Number of records
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_sales_count: u64,
    /// `total_revenue / total_sales_count`, zero when there are no records
    #[serde(default, deserialize_with = "lenient::amount")]
    pub avg_order_value: Decimal,
    /// Item with the highest summed quantity (first seen wins ties)
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub best_selling_item: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub best_selling_quantity: u64,
    /// Summed quantity per item name
    #[serde(default, deserialize_with = "lenient::count_map")]
    pub items_sold: BTreeMap<String, u64>,
    /// Number of sales per hour of day (0-23), only hours that occurred
    #[serde(default, deserialize_with = "lenient::count_map")]
    pub hourly_sales: BTreeMap<u32, u64>,
    /// Most recent timestamped sales, newest first
    #[serde(default)]
    pub recent_sales: Vec<RecentSale>,
}

impl AnalyticsSummary {
    /// Check if this summary covers no sales at all
    pub fn is_empty(&self) -> bool {
        self.total_sales_count == 0
    }

    /// Hour with the most sales, earliest hour on ties
    pub fn peak_hour(&self) -> Option<u32> {
        let mut peak: Option<(u32, u64)> = None;
        for (&hour, &count) in &self.hourly_sales {
            if count == 0 {
                continue;
            }
            match peak {
                Some((_, best)) if best >= count => {}
                _ => peak = Some((hour, count)),
            }
        }
        peak.map(|(hour, _)| hour)
    }

    /// Sales count for every hour of the day, zero-filled
    pub fn hourly_buckets(&self) -> [u64; 24] {
        let mut buckets = [0u64; 24];
        for (&hour, &count) in &self.hourly_sales {
            if let Some(slot) = buckets.get_mut(hour as usize) {
                *slot = count;
            }
        }
        buckets
    }
}

/// A recent sale as shown in the activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSale {
    #[serde(default, deserialize_with = "lenient::text")]
    pub item_name: String,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total: Decimal,
    /// `HH:MM` of the sale
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
}

impl RecentSale {
    fn from_record(record: &SaleRecord) -> Self {
        Self {
            item_name: record.item_name.clone(),
            quantity: record.quantity,
            price: record.price,
            total: record.line_total(),
            time: record
                .created_at
                .map(|at| at.format("%H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Reduces sale snapshots into summaries
#[derive(Debug, Clone, Copy)]
pub struct SalesAggregator {
    recent_limit: usize,
}

impl Default for SalesAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SalesAggregator {
    pub fn new() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Set how many entries `recent_sales` keeps
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Summarize a snapshot of records
    pub fn summarize<'a, I>(&self, records: I) -> AnalyticsSummary
    where
        I: IntoIterator<Item = &'a SaleRecord>,
    {
        let mut total_revenue = Decimal::ZERO;
        let mut total_sales_count: u64 = 0;
        let mut quantities: HashMap<&str, u64> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();
        let mut hourly_sales: BTreeMap<u32, u64> = BTreeMap::new();
        let mut timestamped: Vec<&SaleRecord> = Vec::new();
        let mut skipped_hours = 0usize;

        for record in records {
            match total_revenue.checked_add(record.line_total()) {
                Some(sum) => total_revenue = sum,
                None => tracing::debug!(id = record.id, "revenue overflowed, sale left out"),
            }
            total_sales_count += 1;

            let name = record.item_name.as_str();
            let entry = quantities.entry(name).or_insert_with(|| {
                first_seen.push(name);
                0
            });
            *entry = entry.saturating_add(u64::from(record.quantity));

            match record.created_at {
                Some(at) => {
                    *hourly_sales.entry(at.hour()).or_insert(0) += 1;
                    timestamped.push(record);
                }
                None => skipped_hours += 1,
            }
        }

        if skipped_hours > 0 {
            tracing::debug!(
                skipped = skipped_hours,
                "sales without readable timestamps left out of hourly figures"
            );
        }

        let avg_order_value = if total_sales_count == 0 {
            Decimal::ZERO
        } else {
            total_revenue / Decimal::from(total_sales_count)
        };

        let mut best: Option<(&str, u64)> = None;
        for name in &first_seen {
            let qty = quantities.get(name).copied().unwrap_or(0);
            match best {
                Some((_, top)) if top >= qty => {}
                _ => best = Some((*name, qty)),
            }
        }

        // Stable sort keeps input order among equal timestamps
        timestamped.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_sales = timestamped
            .into_iter()
            .take(self.recent_limit)
            .map(RecentSale::from_record)
            .collect();

        AnalyticsSummary {
            total_revenue,
            total_sales_count,
            avg_order_value,
            best_selling_item: best.map(|(name, _)| name.to_string()),
            best_selling_quantity: best.map(|(_, qty)| qty).unwrap_or(0),
            items_sold: quantities
                .into_iter()
                .map(|(name, qty)| (name.to_string(), qty))
                .collect(),
            hourly_sales,
            recent_sales,
        }
    }
}

/// Summarize with default settings
pub fn summarize<'a, I>(records: I) -> AnalyticsSummary
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    SalesAggregator::new().summarize(records)
}
