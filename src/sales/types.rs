//! Record types shared by the filters, the aggregator and the view

use super::lenient;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One sale transaction line
///
/// Records are immutable snapshots handed out by the backend. The line total
/// is never stored, see [`SaleRecord::line_total`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Server-assigned id (0 when the backend omitted it)
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: u64,
    /// Name of the item sold
    #[serde(default, deserialize_with = "lenient::text")]
    pub item_name: String,
    /// Units sold
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    /// Unit price at the time of sale
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: Decimal,
    /// Server-local wall-clock time of insertion, `None` if unreadable
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl SaleRecord {
    /// Create a record with the given fields and no timestamp
    pub fn new(id: u64, item_name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            id,
            item_name: item_name.into(),
            quantity,
            price,
            created_at: None,
        }
    }

    /// Builder method: set the creation time
    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    /// `quantity * price`, computed on demand
    ///
    /// A product outside the `Decimal` range counts as zero.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity)
            .checked_mul(self.price)
            .unwrap_or_else(|| {
                tracing::debug!(id = self.id, "line total overflowed, counted as zero");
                Decimal::ZERO
            })
    }
}

/// One row of the inventory list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default, deserialize_with = "lenient::id")]
    pub item_id: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub item_name: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: Decimal,
    /// Units in stock
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: u32,
}

impl InventoryItem {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_line_total() {
        let sale = SaleRecord::new(1, "Tea", 2, Decimal::new(350, 2));
        assert_eq!(sale.line_total(), Decimal::new(700, 2));

        let free = SaleRecord::new(2, "Sample", 5, Decimal::ZERO);
        assert_eq!(free.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_decode_backend_sale() {
        let json = r#"{
            "id": 7,
            "item_name": "Cake",
            "quantity": 1.0,
            "price": "12.00",
            "created_at": "Tue, 02 Jan 2024 10:00:00 GMT"
        }"#;
        let sale: SaleRecord = serde_json::from_str(json).unwrap();

        assert_eq!(sale.id, 7);
        assert_eq!(sale.item_name, "Cake");
        assert_eq!(sale.quantity, 1);
        assert_eq!(sale.price, Decimal::new(12, 0));
        assert_eq!(sale.created_at.map(|dt| dt.hour()), Some(10));
    }

    #[test]
    fn test_decode_degraded_sale() {
        let json = r#"{"id": 3, "item_name": "Tea", "price": null, "created_at": "??"}"#;
        let sale: SaleRecord = serde_json::from_str(json).unwrap();

        assert_eq!(sale.quantity, 0);
        assert_eq!(sale.price, Decimal::ZERO);
        assert_eq!(sale.created_at, None);
        assert_eq!(sale.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_decode_non_scalar_fields() {
        let json = r#"[
            {"id": 1, "item_name": "Cake", "quantity": 1, "price": {"amount": "12.00"}},
            {"id": 2, "item_name": "Tea", "quantity": [2], "price": 3.5},
            {"id": {"value": 3}, "item_name": ["Bun"], "quantity": 1, "price": 1,
             "created_at": {"$date": "2024-01-01"}},
            {"id": 4, "item_name": "Jam", "quantity": 2, "price": "2.00"}
        ]"#;
        let sales: Vec<SaleRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(sales.len(), 4);
        assert_eq!(sales[0].price, Decimal::ZERO);
        assert_eq!(sales[0].quantity, 1);
        assert_eq!(sales[1].quantity, 0);
        assert_eq!(sales[1].price, Decimal::new(35, 1));
        assert_eq!(sales[2].id, 0);
        assert_eq!(sales[2].item_name, "");
        assert_eq!(sales[2].created_at, None);
        assert_eq!(sales[3].line_total(), Decimal::from(4));
    }

    #[test]
    fn test_line_total_overflow() {
        let json = r#"[
            {"id": 1, "item_name": "Gold", "quantity": 8, "price": 1e28},
            {"id": 2, "item_name": "Tea", "quantity": 2, "price": 3.5}
        ]"#;
        let sales: Vec<SaleRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(sales[0].price, Decimal::from(10u128.pow(28)));
        assert_eq!(sales[0].line_total(), Decimal::ZERO);
        assert_eq!(sales[1].line_total(), Decimal::from(7));
    }

    #[test]
    fn test_decode_inventory_item() {
        let json = r#"[{"item_id": 1, "item_name": "Tea", "price": 3.5, "quantity": 0}]"#;
        let items: Vec<InventoryItem> = serde_json::from_str(json).unwrap();

        assert_eq!(items.len(), 1);
        assert!(items[0].is_out_of_stock());
        assert_eq!(items[0].price, Decimal::new(35, 1));
    }
}
