//! Dashboard controller
//!
//! Owns everything the dashboard shows between renders: the last sales
//! snapshot, the last server summary, the inventory list with its stock
//! chart, and the active filter. Each render hands that state by reference
//! to [`SalesView`]; refreshes replace one piece of it at a time through
//! [`RefreshHandler`].
//!
//! Writes (sales and inventory items) go to the source first and are then
//! routed through the same [`ActionDispatcher`] as the assistant's actions,
//! so a recorded sale refreshes exactly what a chat-recorded sale would.

use crate::analytics::{AnalyticsSummary, ChartSeries};
use crate::chat::{
    ActionDispatcher, ChatAction, DispatchReport, RefreshHandler, RefreshOp, CONNECTION_TROUBLE,
};
use crate::filter::TimeWindow;
use crate::sales::{InventoryItem, SaleRecord};
use crate::source::{NewItem, NewSale, SalesSource, SourceError, SourceResult, WriteReceipt};
use crate::view::{SalesRender, SalesView};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Active window and search text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub window: TimeWindow,
    pub query: String,
}

/// Data fetched from the source, replaced wholesale on refresh
struct DashboardState<S> {
    source: S,
    sales: Vec<SaleRecord>,
    analytics: Option<AnalyticsSummary>,
    items: Vec<InventoryItem>,
    stock_chart: Option<ChartSeries>,
}

impl<S: SalesSource> DashboardState<S> {
    fn new(source: S) -> Self {
        Self {
            source,
            sales: Vec::new(),
            analytics: None,
            items: Vec::new(),
            stock_chart: None,
        }
    }
}

#[async_trait]
impl<S: SalesSource> RefreshHandler for DashboardState<S> {
    async fn refresh(&mut self, op: RefreshOp) -> Result<(), SourceError> {
        match op {
            RefreshOp::ReloadSales => {
                self.sales = self.source.fetch_sales().await?;
                tracing::info!(source = self.source.name(), "Loaded {} sales", self.sales.len());
            }
            RefreshOp::ReloadAnalytics => {
                let summary = self.source.fetch_analytics().await?;
                tracing::info!(
                    source = self.source.name(),
                    "Loaded analytics covering {} sales",
                    summary.total_sales_count
                );
                self.analytics = Some(summary);
            }
            RefreshOp::ReloadInventory => {
                self.items = self.source.fetch_items().await?;
                tracing::info!(source = self.source.name(), "Loaded {} items", self.items.len());
            }
            RefreshOp::ReloadStockChart => {
                let chart = self.source.fetch_stock_chart().await?;
                tracing::debug!(source = self.source.name(), "{} items in stock", chart.len());
                self.stock_chart = Some(chart);
            }
        }
        Ok(())
    }
}

/// What one chat exchange produced
#[derive(Debug, Default)]
pub struct ChatOutcome {
    /// Messages to append to the conversation, in order
    pub messages: Vec<String>,
    /// Action the assistant reported, if any
    pub action: Option<ChatAction>,
    /// Refreshes run because of the action
    pub report: DispatchReport,
}

/// What one write produced
#[derive(Debug, Default)]
pub struct WriteOutcome {
    /// The backend's answer
    pub receipt: WriteReceipt,
    /// Refreshes run because of the write
    pub report: DispatchReport,
}

/// Single owner of dashboard state
///
/// The fetched data is only reachable through the accessors; the state
/// holder itself is not part of the API:
///
/// ```compile_fail
/// use laku::controller::DashboardState;
/// ```
pub struct DashboardController<S> {
    state: DashboardState<S>,
    view: SalesView,
    dispatcher: ActionDispatcher,
    filter: FilterState,
}

impl<S: SalesSource> DashboardController<S> {
    pub fn new(source: S) -> Self {
        Self {
            state: DashboardState::new(source),
            view: SalesView::new(),
            dispatcher: ActionDispatcher::default(),
            filter: FilterState::default(),
        }
    }

    /// Builder: view settings (page size, summary mode, chart size)
    pub fn with_view(mut self, view: SalesView) -> Self {
        self.view = view;
        self
    }

    /// Builder: replace the action routes
    pub fn with_dispatcher(mut self, dispatcher: ActionDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn source(&self) -> &S {
        &self.state.source
    }

    pub fn view(&self) -> &SalesView {
        &self.view
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sales(&self) -> &[SaleRecord] {
        &self.state.sales
    }

    pub fn analytics(&self) -> Option<&AnalyticsSummary> {
        self.state.analytics.as_ref()
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.state.items
    }

    /// Last loaded stock level chart
    pub fn stock_chart(&self) -> Option<&ChartSeries> {
        self.state.stock_chart.as_ref()
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        self.filter.window = window;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    /// Run one refresh operation, keeping the previous data on failure
    pub async fn refresh(&mut self, op: RefreshOp) -> Result<(), SourceError> {
        self.state.refresh(op).await
    }

    /// Reload sales, analytics, inventory and the stock chart in turn
    ///
    /// A failed reload is logged and reported; the others still run.
    pub async fn refresh_all(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();

        for op in [
            RefreshOp::ReloadSales,
            RefreshOp::ReloadAnalytics,
            RefreshOp::ReloadInventory,
            RefreshOp::ReloadStockChart,
        ] {
            match self.state.refresh(op).await {
                Ok(()) => report.performed.push(op),
                Err(e) => {
                    tracing::warn!(%op, "refresh failed: {}", e);
                    report.failed.push((op, e.to_string()));
                }
            }
        }

        report
    }

    /// Render the table and summary as of `now`
    pub fn render(&self, now: NaiveDateTime) -> SalesRender {
        self.view.render(
            &self.state.sales,
            self.filter.window,
            &self.filter.query,
            now,
            self.state.analytics.as_ref(),
        )
    }

    /// Render against the local clock
    pub fn render_now(&self) -> SalesRender {
        self.render(chrono::Local::now().naive_local())
    }

    /// Send a message to the assistant and run the refreshes its action needs
    ///
    /// Blank input is ignored. A failed request produces the connection
    /// trouble message instead of an error.
    pub async fn chat(&mut self, text: &str) -> ChatOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ChatOutcome::default();
        }

        let reply = match self.state.source.send_chat(text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                return ChatOutcome {
                    messages: vec![CONNECTION_TROUBLE.to_string()],
                    ..ChatOutcome::default()
                };
            }
        };

        let action = reply.action();
        let report = match &action {
            Some(action) => self.dispatcher.dispatch(action, &mut self.state).await,
            None => DispatchReport::default(),
        };

        ChatOutcome {
            messages: reply.messages(),
            action,
            report,
        }
    }

    /// Record a sale, then reload what a sale changes
    ///
    /// Invalid input is rejected before anything is sent. Nothing is
    /// refreshed when the source refuses the write.
    pub async fn add_sale(&mut self, sale: &NewSale) -> SourceResult<WriteOutcome> {
        sale.validate()?;
        let receipt = self.state.source.add_sale(sale).await?;
        tracing::info!(item = %sale.item_name, quantity = sale.quantity, "Sale recorded");

        Ok(self.after_write(ChatAction::AddSale, receipt).await)
    }

    /// Delete a sale, then reload what a sale changes
    pub async fn delete_sale(&mut self, id: u64) -> SourceResult<WriteOutcome> {
        let receipt = self.state.source.delete_sale(id).await?;
        tracing::info!(id, "Sale deleted");

        Ok(self.after_write(ChatAction::RemoveSale, receipt).await)
    }

    /// Create an inventory item, then reload the inventory
    pub async fn add_item(&mut self, item: &NewItem) -> SourceResult<WriteOutcome> {
        item.validate()?;
        let receipt = self.state.source.add_item(item).await?;
        tracing::info!(item = %item.item_name, quantity = item.quantity, "Item added");

        Ok(self.after_write(ChatAction::AddInventory, receipt).await)
    }

    /// Delete an inventory item, then reload the inventory
    pub async fn delete_item(&mut self, id: u64) -> SourceResult<WriteOutcome> {
        let receipt = self.state.source.delete_item(id).await?;
        tracing::info!(id, "Item deleted");

        Ok(self.after_write(ChatAction::RemoveInventory, receipt).await)
    }

    async fn after_write(&mut self, action: ChatAction, receipt: WriteReceipt) -> WriteOutcome {
        let report = self.dispatcher.dispatch(&action, &mut self.state).await;
        WriteOutcome { receipt, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::stock_series;
    use crate::chat::ChatReply;
    use crate::view::SummaryMode;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSource {
        sales: Mutex<Vec<SaleRecord>>,
        analytics: Mutex<Option<AnalyticsSummary>>,
        items: Mutex<Vec<InventoryItem>>,
        reply: Option<ChatReply>,
        fail_sales: AtomicBool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl MockSource {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SalesSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_sales(&self) -> SourceResult<Vec<SaleRecord>> {
            self.record("sales");
            if self.fail_sales.load(Ordering::SeqCst) {
                return Err(SourceError::Timeout);
            }
            Ok(self.sales.lock().unwrap().clone())
        }

        async fn fetch_analytics(&self) -> SourceResult<AnalyticsSummary> {
            self.record("analytics");
            self.analytics
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| SourceError::Backend("no analytics".to_string()))
        }

        async fn fetch_items(&self) -> SourceResult<Vec<InventoryItem>> {
            self.record("items");
            Ok(self.items.lock().unwrap().clone())
        }

        async fn fetch_stock_chart(&self) -> SourceResult<ChartSeries> {
            self.record("stock");
            let items = self.items.lock().unwrap();
            Ok(stock_series(
                items
                    .iter()
                    .map(|item| (item.item_name.as_str(), u64::from(item.quantity))),
            ))
        }

        async fn send_chat(&self, _text: &str) -> SourceResult<ChatReply> {
            self.record("chat");
            self.reply
                .clone()
                .ok_or_else(|| SourceError::Unavailable("mock".to_string()))
        }

        async fn add_sale(&self, sale: &NewSale) -> SourceResult<WriteReceipt> {
            self.record("add_sale");
            let mut sales = self.sales.lock().unwrap();
            let id = sales.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            sales.insert(0, SaleRecord::new(id, sale.item_name.clone(), sale.quantity, sale.price));
            Ok(WriteReceipt::message(format!("Recorded sale {}", id)))
        }

        async fn delete_sale(&self, id: u64) -> SourceResult<WriteReceipt> {
            self.record("delete_sale");
            let mut sales = self.sales.lock().unwrap();
            let before = sales.len();
            sales.retain(|s| s.id != id);
            if sales.len() == before {
                return Err(SourceError::Status {
                    status: 404,
                    message: "Sale not found".to_string(),
                });
            }
            Ok(WriteReceipt::message("Sale deleted"))
        }

        async fn add_item(&self, item: &NewItem) -> SourceResult<WriteReceipt> {
            self.record("add_item");
            let mut items = self.items.lock().unwrap();
            let next_id = items.len() as u64 + 1;
            items.push(InventoryItem {
                item_id: next_id,
                item_name: item.item_name.clone(),
                price: item.price,
                quantity: item.quantity,
            });
            Ok(WriteReceipt::message("Item added successfully"))
        }

        async fn delete_item(&self, id: u64) -> SourceResult<WriteReceipt> {
            self.record("delete_item");
            self.items.lock().unwrap().retain(|item| item.item_id != id);
            Ok(WriteReceipt::message("Item deleted successfully"))
        }
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample_sales() -> Vec<SaleRecord> {
        vec![
            SaleRecord::new(3, "Cake", 1, Decimal::new(1200, 2)).created_at(at(2, 14)),
            SaleRecord::new(2, "Tea", 1, Decimal::new(350, 2)).created_at(at(1, 10)),
            SaleRecord::new(1, "Tea", 2, Decimal::new(350, 2)).created_at(at(1, 9)),
        ]
    }

    fn server_summary() -> AnalyticsSummary {
        AnalyticsSummary {
            total_revenue: Decimal::new(9900, 2),
            total_sales_count: 42,
            ..AnalyticsSummary::default()
        }
    }

    fn mock() -> MockSource {
        MockSource {
            sales: Mutex::new(sample_sales()),
            analytics: Mutex::new(Some(server_summary())),
            ..MockSource::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_all_and_render() {
        let mut controller = DashboardController::new(mock());

        let report = controller.refresh_all().await;
        assert!(report.is_clean());
        assert_eq!(
            controller.source().calls(),
            vec!["sales", "analytics", "items", "stock"]
        );
        assert_eq!(controller.sales().len(), 3);
        assert!(controller.stock_chart().is_some_and(ChartSeries::is_empty));

        let render = controller.render(at(2, 18));
        assert_eq!(render.page.rows.len(), 3);
        assert_eq!(render.summary.analytics.total_sales_count, 42);
        assert_eq!(render.summary.cards.total_revenue, "$99.00");
    }

    #[tokio::test]
    async fn test_filter_changes_table_not_server_summary() {
        let mut controller = DashboardController::new(mock());
        controller.refresh_all().await;

        controller.set_window(TimeWindow::Today);
        controller.set_query("tea");
        let render = controller.render(at(2, 18));

        assert!(render.page.rows.is_empty());
        assert_eq!(
            render.page.empty_message.as_deref(),
            Some("No sales found matching \"tea\"")
        );
        assert_eq!(render.summary.analytics.total_sales_count, 42);
    }

    #[tokio::test]
    async fn test_filtered_summary_mode() {
        let mut controller = DashboardController::new(mock())
            .with_view(SalesView::new().with_summary_mode(SummaryMode::Filtered));
        controller.refresh_all().await;

        controller.set_query("tea");
        let render = controller.render(at(2, 18));

        assert_eq!(render.page.rows.len(), 2);
        assert_eq!(render.summary.analytics.total_sales_count, 2);
        assert_eq!(render.summary.cards.top_item, "Tea");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_state() {
        let mut controller = DashboardController::new(mock());
        controller.refresh_all().await;

        controller.source().sales.lock().unwrap().clear();
        controller.source().fail_sales.store(true, Ordering::SeqCst);
        let report = controller.refresh_all().await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, RefreshOp::ReloadSales);
        assert_eq!(report.performed.len(), 3);
        assert_eq!(controller.sales().len(), 3);
    }

    #[tokio::test]
    async fn test_render_without_analytics() {
        let source = MockSource {
            sales: Mutex::new(sample_sales()),
            ..MockSource::default()
        };
        let mut controller = DashboardController::new(source);
        let report = controller.refresh_all().await;

        assert_eq!(report.failed.len(), 1);
        assert!(controller.analytics().is_none());
        let render = controller.render(at(2, 18));
        assert_eq!(render.summary.cards.top_item, "-");
        assert_eq!(render.page.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_chat_sale_action_reloads_sales() {
        let source = MockSource {
            reply: Some(ChatReply {
                ai_response: Some("Recorded 2 Tea".to_string()),
                action: Some("sale_added".to_string()),
                summary: None,
            }),
            ..mock()
        };
        let mut controller = DashboardController::new(source);

        let outcome = controller.chat("sold 2 tea").await;

        assert_eq!(outcome.messages, vec!["Recorded 2 Tea".to_string()]);
        assert_eq!(outcome.action, Some(ChatAction::SaleAdded));
        assert_eq!(
            outcome.report.performed,
            vec![
                RefreshOp::ReloadSales,
                RefreshOp::ReloadAnalytics,
                RefreshOp::ReloadStockChart
            ]
        );
        assert_eq!(
            controller.source().calls(),
            vec!["chat", "sales", "analytics", "stock"]
        );
        assert_eq!(controller.sales().len(), 3);
    }

    #[tokio::test]
    async fn test_chat_inventory_action() {
        let source = MockSource {
            reply: Some(ChatReply {
                ai_response: Some("Stock updated".to_string()),
                action: Some("update_inventory".to_string()),
                summary: None,
            }),
            ..mock()
        };
        let mut controller = DashboardController::new(source);

        controller.chat("we have 40 tea now").await;
        assert_eq!(controller.source().calls(), vec!["chat", "items", "stock"]);
    }

    #[tokio::test]
    async fn test_chat_failure_and_blank_input() {
        let mut controller = DashboardController::new(mock());

        let outcome = controller.chat("hello").await;
        assert_eq!(outcome.messages, vec![CONNECTION_TROUBLE.to_string()]);
        assert!(outcome.action.is_none());

        let outcome = controller.chat("   ").await;
        assert!(outcome.messages.is_empty());
        assert_eq!(controller.source().calls(), vec!["chat"]);
    }

    #[tokio::test]
    async fn test_add_sale_reloads_like_a_chat_sale() {
        let mut controller = DashboardController::new(mock());

        let outcome = controller
            .add_sale(&NewSale::new("Tea", 2, Decimal::new(350, 2)))
            .await
            .unwrap();

        assert_eq!(outcome.receipt.message.as_deref(), Some("Recorded sale 4"));
        assert!(outcome.report.is_clean());
        assert_eq!(
            controller.source().calls(),
            vec!["add_sale", "sales", "analytics", "stock"]
        );
        assert_eq!(controller.sales().len(), 4);
        assert_eq!(controller.sales()[0].id, 4);
    }

    #[tokio::test]
    async fn test_invalid_sale_is_not_sent() {
        let mut controller = DashboardController::new(mock());

        let err = controller
            .add_sale(&NewSale::new("Tea", 0, Decimal::ONE))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::InvalidInput(_)));
        assert!(controller.source().calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_sale() {
        let mut controller = DashboardController::new(mock());
        controller.refresh_all().await;

        let outcome = controller.delete_sale(2).await.unwrap();
        assert_eq!(
            outcome.report.performed,
            vec![
                RefreshOp::ReloadSales,
                RefreshOp::ReloadAnalytics,
                RefreshOp::ReloadStockChart
            ]
        );
        let ids: Vec<u64> = controller.sales().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_refused_write_refreshes_nothing() {
        let mut controller = DashboardController::new(mock());

        let err = controller.delete_sale(99).await.unwrap_err();

        assert!(matches!(err, SourceError::Status { status: 404, .. }));
        assert_eq!(controller.source().calls(), vec!["delete_sale"]);
    }

    #[tokio::test]
    async fn test_item_writes_reload_inventory_and_stock() {
        let mut controller = DashboardController::new(mock());

        let item = NewItem::new("Scone", Decimal::new(275, 2)).with_quantity(6);
        let outcome = controller.add_item(&item).await.unwrap();

        assert_eq!(
            outcome.report.performed,
            vec![RefreshOp::ReloadInventory, RefreshOp::ReloadStockChart]
        );
        assert_eq!(controller.items().len(), 1);
        let chart = controller.stock_chart().unwrap();
        assert_eq!(chart.points().collect::<Vec<_>>(), vec![("Scone", 6)]);

        controller.delete_item(1).await.unwrap();
        assert!(controller.items().is_empty());
        assert!(controller.stock_chart().unwrap().is_empty());
        assert_eq!(
            controller.source().calls(),
            vec!["add_item", "items", "stock", "delete_item", "items", "stock"]
        );
    }
}
