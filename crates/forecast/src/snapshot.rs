use serde::{Deserialize, Serialize};

use printstock_inventory::{Category, StockItemId};

/// Point-in-time view of one stock item, as supplied by the stock-levels
/// read model. Inputs are provided by callers; this crate stays
/// storage-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub item_id: StockItemId,
    pub name: String,
    pub brand: String,
    pub category: Category,
    pub quantity: i64,
    pub min_quantity: i64,
}

impl ItemSnapshot {
    /// Display label: `"name (brand)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.brand)
    }
}
