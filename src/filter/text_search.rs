//! Free-text search over sale records

use super::SaleFilter;
use crate::sales::SaleRecord;

/// Case-insensitive substring match on item name or decimal id
///
/// An empty or whitespace-only query matches everything. There is no
/// tokenization: "green tea" must appear as a whole in the item name.
#[derive(Debug, Clone, Default)]
pub struct TextSearchFilter {
    /// Case-folded, trimmed query; `None` when the search is inactive
    needle: Option<String>,
}

impl TextSearchFilter {
    pub fn new(query: &str) -> Self {
        let trimmed = query.trim();
        let needle = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
        Self { needle }
    }

    /// Check if this search restricts anything
    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }
}

impl SaleFilter for TextSearchFilter {
    fn matches(&self, record: &SaleRecord) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };

        if record.item_name.to_lowercase().contains(needle.as_str()) {
            return true;
        }

        // id 0 means the backend sent none
        record.id != 0 && record.id.to_string().contains(needle.as_str())
    }
}
