//! Dashboard summary counters.

use serde::{Deserialize, Serialize};

use crate::snapshot::ItemSnapshot;

/// Headline stock figures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockSummary {
    /// Sum of on-hand quantities across all items.
    pub total_units: i64,
    /// Items with some stock left but at or below their reorder threshold.
    pub low_stock_items: usize,
    /// Items with nothing on the shelf.
    pub out_of_stock_items: usize,
}

pub fn stock_summary(items: &[ItemSnapshot]) -> StockSummary {
    let mut summary = StockSummary::default();
    for item in items {
        summary.total_units += item.quantity;
        if item.quantity == 0 {
            summary.out_of_stock_items += 1;
        } else if item.quantity <= item.min_quantity {
            summary.low_stock_items += 1;
        }
    }
    summary
}
