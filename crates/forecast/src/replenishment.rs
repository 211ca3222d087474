//! Automatic order suggestion.
//!
//! For every item sitting below its reorder threshold, suggest buying enough
//! to reach `min_quantity * restock_multiplier`, prioritised by how starved
//! the item already is.

use serde::{Deserialize, Serialize};

use printstock_inventory::StockItemId;

use crate::snapshot::ItemSnapshot;

/// Suggestion tuning knobs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionParams {
    /// Target stock level as a multiple of the reorder threshold.
    pub restock_multiplier: i64,
    /// Also suggest items whose threshold is met but whose stock is zero.
    pub include_out_of_stock: bool,
}

impl Default for SuggestionParams {
    fn default() -> Self {
        Self {
            restock_multiplier: 2,
            include_out_of_stock: true,
        }
    }
}

/// Urgency bucket for a suggested purchase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One line of the suggested order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSuggestion {
    pub item_id: StockItemId,
    pub item_label: String,
    pub current_quantity: i64,
    pub min_quantity: i64,
    pub suggested_quantity: i64,
    pub priority: Priority,
}

/// Build the suggested order from the current item snapshots.
///
/// Items qualify when below their reorder threshold, or exactly at zero when
/// `include_out_of_stock` is set. Output is sorted by priority, then name.
pub fn order_suggestions(
    items: &[ItemSnapshot],
    params: &SuggestionParams,
) -> Vec<OrderSuggestion> {
    let mut suggestions: Vec<OrderSuggestion> = items
        .iter()
        .filter(|item| {
            item.quantity < item.min_quantity
                || (params.include_out_of_stock && item.quantity == 0)
        })
        .map(|item| {
            // Saturating arithmetic keeps the calculator total even for
            // absurd thresholds or multipliers.
            let target = item.min_quantity.saturating_mul(params.restock_multiplier);
            let suggested_quantity = target.saturating_sub(item.quantity).max(0);

            let priority = if item.quantity == 0 {
                Priority::High
            } else if item.quantity.saturating_mul(2) < item.min_quantity {
                Priority::Medium
            } else {
                Priority::Low
            };

            OrderSuggestion {
                item_id: item.item_id,
                item_label: item.label(),
                current_quantity: item.quantity,
                min_quantity: item.min_quantity,
                suggested_quantity,
                priority,
            }
        })
        .collect();

    suggestions.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.item_label.cmp(&b.item_label))
    });
    suggestions
}
