//! Write requests sent to the backend
//!
//! Sales and inventory items are created through the same source the
//! dashboard reads from. Requests are checked locally before they are sent;
//! the backend still has the final say (stock levels, duplicate names).

use super::{SourceError, SourceResult};
use crate::sales::{lenient, InventoryItem, SaleRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sale to record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSale {
    pub item_name: String,
    pub quantity: u32,
    /// Unit price
    pub price: Decimal,
}

impl NewSale {
    pub fn new(item_name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
            price,
        }
    }

    /// Reject requests the backend would refuse anyway
    pub fn validate(&self) -> SourceResult<()> {
        check_name(&self.item_name)?;
        if self.quantity == 0 {
            return Err(SourceError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }
        check_price(self.price)
    }
}

/// An inventory item to create
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub item_name: String,
    pub price: Decimal,
    /// Units in stock
    pub quantity: u32,
}

impl NewItem {
    /// A new item with one unit in stock
    pub fn new(item_name: impl Into<String>, price: Decimal) -> Self {
        Self {
            item_name: item_name.into(),
            price,
            quantity: 1,
        }
    }

    /// Builder: starting stock
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn validate(&self) -> SourceResult<()> {
        check_name(&self.item_name)?;
        check_price(self.price)
    }
}

fn check_name(name: &str) -> SourceResult<()> {
    if name.trim().is_empty() {
        return Err(SourceError::InvalidInput(
            "item name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_price(price: Decimal) -> SourceResult<()> {
    if price <= Decimal::ZERO {
        return Err(SourceError::InvalidInput(format!(
            "price must be greater than zero, got {}",
            price
        )));
    }
    Ok(())
}

/// What the backend answered to a write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Confirmation text
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub message: Option<String>,
    /// The stored sale, for sale writes
    #[serde(default)]
    pub sale: Option<SaleRecord>,
    /// The stored item, for item writes
    #[serde(default)]
    pub item: Option<InventoryItem>,
}

impl WriteReceipt {
    /// A receipt carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}
