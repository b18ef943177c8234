//! REST backend source
//!
//! HTTP client for the sales backend:
//! - `GET  /api/sales`      → array of sale records
//! - `GET  /api/analytics`  → `{"success": true, "analytics": {...}}`
//! - `GET  /api/items`      → array of inventory items
//! - `GET  /api/inventory/chart-data` → `{"success": true, "data": [{"name", "quantity"}]}`
//! - `POST /ai`             → assistant reply for `{"user_text": ...}`
//!
//! Writes:
//! - `POST   /api/sales`      records a sale and takes it out of stock
//! - `DELETE /api/sales/{id}`
//! - `POST   /api/items`      creates an inventory item
//! - `DELETE /api/items/{id}`

use super::{NewItem, NewSale, SalesSource, SourceError, SourceResult, WriteReceipt};
use crate::analytics::{stock_series, AnalyticsSummary, ChartSeries};
use crate::chat::ChatReply;
use crate::sales::{lenient, InventoryItem, SaleRecord};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL of the backend (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Sales backend client
pub struct HttpSource {
    client: Client,
    config: HttpSourceConfig,
}

#[derive(Debug, Deserialize)]
struct AnalyticsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    analytics: Option<AnalyticsSummary>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StockEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Vec<StockLevel>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StockLevel {
    #[serde(default, deserialize_with = "lenient::text")]
    name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    quantity: u64,
}

/// Write responses; some failures arrive with a success status
#[derive(Debug, Deserialize)]
struct WriteEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    error: Option<String>,
    #[serde(flatten)]
    receipt: WriteReceipt,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    user_text: &'a str,
}

impl HttpSource {
    /// Create a new backend client with the given configuration
    pub fn new(config: HttpSourceConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout
        } else if e.is_connect() {
            SourceError::Unavailable(self.config.base_url.clone())
        } else {
            SourceError::Request(e)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SourceResult<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> SourceResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        decode(response).await
    }

    async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> SourceResult<T> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        decode(response).await
    }
}

/// Turn a response into `T`, surfacing the backend's error text on failure
async fn decode<T: DeserializeOwned>(response: Response) -> SourceResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            message: error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Pull `error`, else `message`, out of an error body
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn unpack_analytics(envelope: AnalyticsEnvelope) -> SourceResult<AnalyticsSummary> {
    match envelope {
        AnalyticsEnvelope {
            success: true,
            analytics: Some(analytics),
            ..
        } => Ok(analytics),
        AnalyticsEnvelope { error, .. } => Err(SourceError::Backend(
            error.unwrap_or_else(|| "analytics unavailable".to_string()),
        )),
    }
}

fn unpack_stock(envelope: StockEnvelope) -> SourceResult<ChartSeries> {
    match envelope {
        StockEnvelope {
            success: true,
            data: Some(levels),
            ..
        } => Ok(stock_series(
            levels.iter().map(|level| (level.name.as_str(), level.quantity)),
        )),
        StockEnvelope { error, .. } => Err(SourceError::Backend(
            error.unwrap_or_else(|| "stock levels unavailable".to_string()),
        )),
    }
}

fn unpack_write(envelope: WriteEnvelope) -> SourceResult<WriteReceipt> {
    let failed = envelope.success == Some(false) || envelope.status.as_deref() == Some("error");
    if failed {
        return Err(SourceError::Backend(
            envelope
                .error
                .or(envelope.receipt.message)
                .unwrap_or_else(|| "write failed".to_string()),
        ));
    }
    Ok(envelope.receipt)
}

#[async_trait]
impl SalesSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_sales(&self) -> SourceResult<Vec<SaleRecord>> {
        let sales: Vec<SaleRecord> = self.get_json("/api/sales").await?;
        tracing::debug!("Fetched {} sales", sales.len());
        Ok(sales)
    }

    async fn fetch_analytics(&self) -> SourceResult<AnalyticsSummary> {
        let envelope: AnalyticsEnvelope = self.get_json("/api/analytics").await?;
        unpack_analytics(envelope)
    }

    async fn fetch_items(&self) -> SourceResult<Vec<InventoryItem>> {
        self.get_json("/api/items").await
    }

    async fn fetch_stock_chart(&self) -> SourceResult<ChartSeries> {
        let envelope: StockEnvelope = self.get_json("/api/inventory/chart-data").await?;
        unpack_stock(envelope)
    }

    async fn send_chat(&self, text: &str) -> SourceResult<ChatReply> {
        self.post_json("/ai", &ChatRequest { user_text: text }).await
    }

    async fn add_sale(&self, sale: &NewSale) -> SourceResult<WriteReceipt> {
        let envelope: WriteEnvelope = self.post_json("/api/sales", sale).await?;
        unpack_write(envelope)
    }

    async fn delete_sale(&self, id: u64) -> SourceResult<WriteReceipt> {
        let envelope: WriteEnvelope = self.delete_json(&format!("/api/sales/{}", id)).await?;
        unpack_write(envelope)
    }

    async fn add_item(&self, item: &NewItem) -> SourceResult<WriteReceipt> {
        let envelope: WriteEnvelope = self.post_json("/api/items", item).await?;
        unpack_write(envelope)
    }

    async fn delete_item(&self, id: u64) -> SourceResult<WriteReceipt> {
        let envelope: WriteEnvelope = self.delete_json(&format!("/api/items/{}", id)).await?;
        unpack_write(envelope)
    }
}
