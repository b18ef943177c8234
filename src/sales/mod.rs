//! Sale and inventory records
//!
//! This module defines the records the dashboard reads from the backend:
//! - `SaleRecord`: one transaction line (item, quantity, unit price, time)
//! - `InventoryItem`: one row of the inventory list
//!
//! Decoding is lenient: a malformed field degrades to a neutral value
//! instead of rejecting the whole record. See [`lenient`].

pub mod lenient;
mod timestamp;
mod types;

pub use timestamp::parse_timestamp;
pub use types::{InventoryItem, SaleRecord};
