//! Action dispatch
//!
//! Maps assistant actions to the refresh operations they require and runs
//! them in order. One failing refresh is recorded and the rest still run.

use super::{ChatAction, RefreshOp};
use crate::source::SourceError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Something that can perform refresh operations
#[async_trait]
pub trait RefreshHandler: Send {
    async fn refresh(&mut self, op: RefreshOp) -> Result<(), SourceError>;
}

/// Outcome of dispatching one action
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Operations that completed
    pub performed: Vec<RefreshOp>,
    /// Operations that failed, with the error text
    pub failed: Vec<(RefreshOp, String)>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Routes assistant actions to refresh operations
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    routes: HashMap<ChatAction, Vec<RefreshOp>>,
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        // Sales move stock too, so every action ends with the stock chart
        let sales = vec![
            RefreshOp::ReloadSales,
            RefreshOp::ReloadAnalytics,
            RefreshOp::ReloadStockChart,
        ];
        let inventory = vec![RefreshOp::ReloadInventory, RefreshOp::ReloadStockChart];

        let mut routes = HashMap::new();
        for action in [ChatAction::AddSale, ChatAction::SaleAdded, ChatAction::RemoveSale] {
            routes.insert(action, sales.clone());
        }
        for action in [
            ChatAction::AddInventory,
            ChatAction::UpdateInventory,
            ChatAction::RemoveInventory,
        ] {
            routes.insert(action, inventory.clone());
        }

        Self { routes }
    }
}

impl ActionDispatcher {
    /// A dispatcher with no routes
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Builder: route an action to a list of operations, replacing any previous route
    pub fn route(mut self, action: ChatAction, ops: Vec<RefreshOp>) -> Self {
        self.routes.insert(action, ops);
        self
    }

    /// Operations an action maps to; empty for unrouted actions
    pub fn plan(&self, action: &ChatAction) -> &[RefreshOp] {
        self.routes.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run every operation routed from `action` against `handler`
    pub async fn dispatch<H>(&self, action: &ChatAction, handler: &mut H) -> DispatchReport
    where
        H: RefreshHandler + ?Sized,
    {
        let mut report = DispatchReport::default();
        let plan = self.plan(action);

        if plan.is_empty() {
            tracing::debug!(%action, "no refresh routed for action");
            return report;
        }

        for op in plan {
            match handler.refresh(*op).await {
                Ok(()) => {
                    tracing::debug!(%action, %op, "refresh complete");
                    report.performed.push(*op);
                }
                Err(e) => {
                    tracing::warn!(%action, %op, "refresh failed: {}", e);
                    report.failed.push((*op, e.to_string()));
                }
            }
        }

        report
    }
}
