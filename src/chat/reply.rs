//! Assistant reply types

use crate::sales::lenient;
use crate::view::format::format_currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shown when the reply carries no text
pub const NO_REPLY: &str = "I'm sorry, I couldn't process your request. Please try again.";

/// Shown when the assistant could not be reached
pub const CONNECTION_TROUBLE: &str =
    "I'm having trouble connecting to the server. Please try again later.";

/// Something the dashboard can reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOp {
    /// Refetch the sales snapshot
    ReloadSales,
    /// Refetch the server summary
    ReloadAnalytics,
    /// Refetch the inventory list
    ReloadInventory,
    /// Refetch the stock level chart
    ReloadStockChart,
}

impl std::fmt::Display for RefreshOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReloadSales => write!(f, "reload_sales"),
            Self::ReloadAnalytics => write!(f, "reload_analytics"),
            Self::ReloadInventory => write!(f, "reload_inventory"),
            Self::ReloadStockChart => write!(f, "reload_stock_chart"),
        }
    }
}

/// Action token attached to an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatAction {
    AddSale,
    SaleAdded,
    RemoveSale,
    AddInventory,
    UpdateInventory,
    RemoveInventory,
    /// Any token this dashboard has no meaning for
    Other(String),
}

impl ChatAction {
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "add_sale" => Self::AddSale,
            "sale_added" => Self::SaleAdded,
            "remove_sale" => Self::RemoveSale,
            "add_inventory" => Self::AddInventory,
            "update_inventory" => Self::UpdateInventory,
            "remove_inventory" => Self::RemoveInventory,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_sales_action(&self) -> bool {
        matches!(self, Self::AddSale | Self::SaleAdded | Self::RemoveSale)
    }

    pub fn is_inventory_action(&self) -> bool {
        matches!(
            self,
            Self::AddInventory | Self::UpdateInventory | Self::RemoveInventory
        )
    }
}

impl std::fmt::Display for ChatAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddSale => write!(f, "add_sale"),
            Self::SaleAdded => write!(f, "sale_added"),
            Self::RemoveSale => write!(f, "remove_sale"),
            Self::AddInventory => write!(f, "add_inventory"),
            Self::UpdateInventory => write!(f, "update_inventory"),
            Self::RemoveInventory => write!(f, "remove_inventory"),
            Self::Other(token) => write!(f, "{}", token),
        }
    }
}

/// Summary block the assistant may attach to a reply
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatSummary {
    #[serde(default, deserialize_with = "lenient::optional_amount")]
    pub total_revenue: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub best_selling_item: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub peak_hour: Option<String>,
}

impl ChatSummary {
    /// Render as a chat message
    pub fn render_text(&self) -> String {
        let mut text = String::from("📊 Summary:\n");
        if let Some(revenue) = self.total_revenue {
            text.push_str(&format!("• Total Revenue: {}\n", format_currency(revenue)));
        }
        if let Some(item) = self.best_selling_item.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(&format!("• Best Selling Item: {}\n", item));
        }
        if let Some(hour) = self.peak_hour.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(&format!("• Peak Sales Hour: {}\n", hour));
        }
        text
    }
}

/// Response of the assistant endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub summary: Option<ChatSummary>,
}

impl ChatReply {
    /// Decoded action, if the reply carried a non-empty token
    pub fn action(&self) -> Option<ChatAction> {
        self.action
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .map(ChatAction::from_token)
    }

    /// Messages to append to the conversation, in order
    ///
    /// A reply without text yields only the apology; its summary is dropped.
    pub fn messages(&self) -> Vec<String> {
        match self.ai_response.as_deref().filter(|s| !s.is_empty()) {
            Some(text) => {
                let mut messages = vec![text.to_string()];
                if let Some(summary) = &self.summary {
                    messages.push(summary.render_text());
                }
                messages
            }
            None => vec![NO_REPLY.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tokens() {
        assert_eq!(ChatAction::from_token("add_sale"), ChatAction::AddSale);
        assert_eq!(ChatAction::from_token(" remove_inventory "), ChatAction::RemoveInventory);
        assert_eq!(
            ChatAction::from_token("greet"),
            ChatAction::Other("greet".to_string())
        );
        assert!(ChatAction::SaleAdded.is_sales_action());
        assert!(!ChatAction::SaleAdded.is_inventory_action());
        assert!(ChatAction::UpdateInventory.is_inventory_action());
        assert_eq!(ChatAction::RemoveSale.to_string(), "remove_sale");
    }

    #[test]
    fn test_decode_reply() {
        let json = r#"{
            "ai_response": "Recorded 2 Tea.",
            "action": "add_sale",
            "summary": {"total_revenue": 26, "best_selling_item": "Tea", "peak_hour": 14}
        }"#;
        let reply: ChatReply = serde_json::from_str(json).unwrap();

        assert_eq!(reply.action(), Some(ChatAction::AddSale));
        let messages = reply.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "Recorded 2 Tea.");
        assert_eq!(
            messages[1],
            "📊 Summary:\n• Total Revenue: $26.00\n• Best Selling Item: Tea\n• Peak Sales Hour: 14\n"
        );
    }

    #[test]
    fn test_reply_without_text() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"action": "", "summary": {"total_revenue": 1}}"#).unwrap();

        assert_eq!(reply.action(), None);
        assert_eq!(reply.messages(), vec![NO_REPLY.to_string()]);
    }

    #[test]
    fn test_partial_summary() {
        let summary = ChatSummary {
            best_selling_item: Some("Cake".to_string()),
            ..ChatSummary::default()
        };
        assert_eq!(summary.render_text(), "📊 Summary:\n• Best Selling Item: Cake\n");
    }
}
