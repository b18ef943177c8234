//! File snapshot source
//!
//! Reads a sales export from disk. JSON files hold the same array the
//! backend's `/api/sales` returns; CSV files carry one sale per row with the
//! columns located by header name. There is no server to compute the
//! summary, so analytics are aggregated locally from the snapshot. Snapshots
//! are read-only: writes report [`SourceError::Unsupported`].

use super::{SalesSource, SourceError, SourceResult};
use crate::analytics::{AnalyticsSummary, SalesAggregator};
use crate::sales::{lenient, parse_timestamp, InventoryItem, SaleRecord};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Supported snapshot file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Csv,
}

impl SnapshotFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(SourceError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Column positions of a sales CSV, detected from its header row
#[derive(Debug, Default)]
struct SalesColumns {
    id: Option<usize>,
    item_name: Option<usize>,
    quantity: Option<usize>,
    price: Option<usize>,
    created_at: Option<usize>,
}

impl SalesColumns {
    fn detect(headers: &csv::StringRecord) -> Self {
        let mut columns = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            match header.trim().to_lowercase().replace(' ', "_").as_str() {
                "id" | "sale_id" => columns.id = Some(idx),
                "item_name" | "item" | "name" => columns.item_name = Some(idx),
                "quantity" | "qty" => columns.quantity = Some(idx),
                "price" | "unit_price" => columns.price = Some(idx),
                "created_at" | "sale_date" | "date" | "timestamp" => columns.created_at = Some(idx),
                _ => {}
            }
        }
        columns
    }
}

fn field<'r>(record: &'r csv::StringRecord, column: Option<usize>) -> &'r str {
    column.and_then(|idx| record.get(idx)).unwrap_or("").trim()
}

/// Read every data row, logging and skipping the ones the CSV reader rejects
fn readable_rows(reader: &mut csv::Reader<&[u8]>, kind: &str) -> Vec<csv::StringRecord> {
    let mut rows = Vec::new();
    let mut rows_failed = 0usize;

    for (line_num, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => {
                tracing::warn!("Line {}: {}", line_num + 2, e);
                rows_failed += 1;
            }
        }
    }

    if rows_failed > 0 {
        tracing::warn!("Skipped {} unreadable {} CSV rows", rows_failed, kind);
    }
    rows
}

/// Parse a sales CSV, skipping rows the CSV reader cannot read
pub fn parse_sales_csv(data: impl AsRef<[u8]>) -> SourceResult<Vec<SaleRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_ref());

    let columns = SalesColumns::detect(reader.headers()?);
    if columns.item_name.is_none() {
        return Err(SourceError::UnsupportedFormat(
            "sales CSV needs an item_name column".to_string(),
        ));
    }

    let sales = readable_rows(&mut reader, "sales")
        .iter()
        .map(|record| {
            let quantity = lenient::parse_count(field(record, columns.quantity));
            SaleRecord {
                id: lenient::parse_count(field(record, columns.id)),
                item_name: field(record, columns.item_name).to_string(),
                quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
                price: lenient::parse_amount(field(record, columns.price)),
                created_at: parse_timestamp(field(record, columns.created_at)),
            }
        })
        .collect();

    Ok(sales)
}

/// Parse an inventory CSV with `item_id,item_name,price,quantity` headers,
/// skipping unreadable rows
pub fn parse_items_csv(data: impl AsRef<[u8]>) -> SourceResult<Vec<InventoryItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_ref());

    let headers = reader.headers()?.clone();
    let position = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
    };
    let id = position(&["item_id", "id"]);
    let name = position(&["item_name", "name", "item"]);
    let price = position(&["price"]);
    let quantity = position(&["quantity", "qty", "stock"]);

    let items = readable_rows(&mut reader, "inventory")
        .iter()
        .map(|record| {
            let stock = lenient::parse_count(field(record, quantity));
            InventoryItem {
                item_id: lenient::parse_count(field(record, id)),
                item_name: field(record, name).to_string(),
                price: lenient::parse_amount(field(record, price)),
                quantity: u32::try_from(stock).unwrap_or(u32::MAX),
            }
        })
        .collect();

    Ok(items)
}

/// Source backed by snapshot files
pub struct FileSource {
    sales_path: PathBuf,
    items_path: Option<PathBuf>,
    aggregator: SalesAggregator,
}

impl FileSource {
    /// Create a source reading sales from `sales_path`
    pub fn new(sales_path: impl Into<PathBuf>) -> Self {
        Self {
            sales_path: sales_path.into(),
            items_path: None,
            aggregator: SalesAggregator::new(),
        }
    }

    /// Builder: read the inventory list from `path`
    pub fn with_items(mut self, path: impl Into<PathBuf>) -> Self {
        self.items_path = Some(path.into());
        self
    }

    /// Builder: aggregator used for the local summary
    pub fn with_aggregator(mut self, aggregator: SalesAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn sales_path(&self) -> &Path {
        &self.sales_path
    }
}

#[async_trait]
impl SalesSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_sales(&self) -> SourceResult<Vec<SaleRecord>> {
        let format = SnapshotFormat::from_path(&self.sales_path)?;
        let data = tokio::fs::read(&self.sales_path).await?;

        let sales = match format {
            SnapshotFormat::Json => serde_json::from_slice(&data)?,
            SnapshotFormat::Csv => parse_sales_csv(&data)?,
        };

        tracing::debug!("Loaded {} sales from {:?}", sales.len(), self.sales_path);
        Ok(sales)
    }

    async fn fetch_analytics(&self) -> SourceResult<AnalyticsSummary> {
        let sales = self.fetch_sales().await?;
        Ok(self.aggregator.summarize(&sales))
    }

    async fn fetch_items(&self) -> SourceResult<Vec<InventoryItem>> {
        let Some(path) = &self.items_path else {
            return Ok(Vec::new());
        };

        let data = tokio::fs::read(path).await?;
        match SnapshotFormat::from_path(path)? {
            SnapshotFormat::Json => Ok(serde_json::from_slice(&data)?),
            SnapshotFormat::Csv => parse_items_csv(&data),
        }
    }
}
