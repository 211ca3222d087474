use std::collections::HashMap;

use printstock_events::{EventEnvelope, Projection};
use printstock_forecast::ItemSnapshot;
use printstock_inventory::{StockItemEvent, StockItemId};

/// Queryable read model: the current state of every active item.
///
/// This is the `items` feed of the forecaster and the input of the
/// suggestion and summary calculators. Retired items drop out entirely.
#[derive(Debug, Default)]
pub struct StockLevels {
    items: HashMap<StockItemId, ItemSnapshot>,
}

impl StockLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item_id: StockItemId) -> Option<&ItemSnapshot> {
        self.items.get(&item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All active items, sorted by name for stable display.
    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        let mut items: Vec<ItemSnapshot> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }
}

impl Projection for StockLevels {
    type Ev = StockItemEvent;

    fn apply(&mut self, envelope: &EventEnvelope<StockItemEvent>) {
        match envelope.payload() {
            StockItemEvent::ItemRegistered(e) => {
                self.items.insert(
                    e.item_id,
                    ItemSnapshot {
                        item_id: e.item_id,
                        name: e.name.clone(),
                        brand: e.brand.clone(),
                        category: e.category,
                        quantity: e.initial_quantity,
                        min_quantity: e.min_quantity,
                    },
                );
            }
            StockItemEvent::EntryRecorded(e) => {
                if let Some(item) = self.items.get_mut(&e.item_id) {
                    item.quantity += e.quantity;
                }
            }
            StockItemEvent::ExitRecorded(e) => {
                if let Some(item) = self.items.get_mut(&e.item_id) {
                    item.quantity -= e.quantity;
                }
            }
            StockItemEvent::DetailsUpdated(e) => {
                if let Some(item) = self.items.get_mut(&e.item_id) {
                    item.name = e.name.clone();
                    item.brand = e.brand.clone();
                    item.min_quantity = e.min_quantity;
                }
            }
            StockItemEvent::ItemRetired(e) => {
                self.items.remove(&e.item_id);
            }
        }
    }
}
