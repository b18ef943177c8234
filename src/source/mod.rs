//! Sales data sources
//!
//! A source delivers the snapshots the dashboard renders:
//! - the list of sale records
//! - the separately computed analytics summary
//! - the inventory list and its stock chart
//!
//! Two implementations exist: [`HttpSource`] talks to the sales backend's
//! REST API and also accepts writes, [`FileSource`] reads a JSON or CSV
//! export from disk and is read-only.

mod error;
mod file;
mod http;
mod write;

pub use error::{SourceError, SourceResult};
pub use file::{FileSource, SnapshotFormat};
pub use http::{HttpSource, HttpSourceConfig};
pub use write::{NewItem, NewSale, WriteReceipt};

use crate::analytics::{stock_series, AnalyticsSummary, ChartSeries};
use crate::chat::ChatReply;
use crate::sales::{InventoryItem, SaleRecord};
use async_trait::async_trait;

/// Common trait for all sales data sources
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// Short name for logs and errors
    fn name(&self) -> &str;

    /// Fetch every sale record, newest first as the backend orders them
    async fn fetch_sales(&self) -> SourceResult<Vec<SaleRecord>>;

    /// Fetch the summary covering all sales
    async fn fetch_analytics(&self) -> SourceResult<AnalyticsSummary>;

    /// Fetch the inventory list
    async fn fetch_items(&self) -> SourceResult<Vec<InventoryItem>>;

    /// Fetch the stock level chart
    ///
    /// Defaults to building it from [`SalesSource::fetch_items`].
    async fn fetch_stock_chart(&self) -> SourceResult<ChartSeries> {
        let items = self.fetch_items().await?;
        Ok(stock_series(
            items
                .iter()
                .map(|item| (item.item_name.as_str(), u64::from(item.quantity))),
        ))
    }

    /// Send a message to the assistant
    async fn send_chat(&self, text: &str) -> SourceResult<ChatReply> {
        let _ = text;
        Err(SourceError::unsupported("chat", self.name()))
    }

    /// Record a sale
    async fn add_sale(&self, sale: &NewSale) -> SourceResult<WriteReceipt> {
        let _ = sale;
        Err(SourceError::unsupported("add sale", self.name()))
    }

    /// Delete a sale by id
    async fn delete_sale(&self, id: u64) -> SourceResult<WriteReceipt> {
        let _ = id;
        Err(SourceError::unsupported("delete sale", self.name()))
    }

    /// Create an inventory item
    async fn add_item(&self, item: &NewItem) -> SourceResult<WriteReceipt> {
        let _ = item;
        Err(SourceError::unsupported("add item", self.name()))
    }

    /// Delete an inventory item by id
    async fn delete_item(&self, id: u64) -> SourceResult<WriteReceipt> {
        let _ = id;
        Err(SourceError::unsupported("delete item", self.name()))
    }
}

#[async_trait]
impl SalesSource for Box<dyn SalesSource> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_sales(&self) -> SourceResult<Vec<SaleRecord>> {
        (**self).fetch_sales().await
    }

    async fn fetch_analytics(&self) -> SourceResult<AnalyticsSummary> {
        (**self).fetch_analytics().await
    }

    async fn fetch_items(&self) -> SourceResult<Vec<InventoryItem>> {
        (**self).fetch_items().await
    }

    async fn fetch_stock_chart(&self) -> SourceResult<ChartSeries> {
        (**self).fetch_stock_chart().await
    }

    async fn send_chat(&self, text: &str) -> SourceResult<ChatReply> {
        (**self).send_chat(text).await
    }

    async fn add_sale(&self, sale: &NewSale) -> SourceResult<WriteReceipt> {
        (**self).add_sale(sale).await
    }

    async fn delete_sale(&self, id: u64) -> SourceResult<WriteReceipt> {
        (**self).delete_sale(id).await
    }

    async fn add_item(&self, item: &NewItem) -> SourceResult<WriteReceipt> {
        (**self).add_item(item).await
    }

    async fn delete_item(&self, id: u64) -> SourceResult<WriteReceipt> {
        (**self).delete_item(id).await
    }
}
