use printstock_events::{EventEnvelope, Projection};
use printstock_inventory::{MovementKind, StockItemEvent, StockItemId, StockMovement};

/// Append-only read model of every recorded movement.
///
/// This is the `movements` feed of the forecaster. The originating event id
/// doubles as the movement id.
#[derive(Debug, Default)]
pub struct MovementHistory {
    movements: Vec<StockMovement>,
}

impl MovementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// All movements, in application order.
    pub fn movements(&self) -> &[StockMovement] {
        &self.movements
    }

    pub fn for_item(&self, item_id: StockItemId) -> impl Iterator<Item = &StockMovement> {
        self.movements.iter().filter(move |m| m.item_id == item_id)
    }
}

impl Projection for MovementHistory {
    type Ev = StockItemEvent;

    fn apply(&mut self, envelope: &EventEnvelope<StockItemEvent>) {
        match envelope.payload() {
            StockItemEvent::EntryRecorded(e) => {
                self.movements.push(StockMovement {
                    movement_id: envelope.event_id(),
                    item_id: e.item_id,
                    kind: MovementKind::In,
                    quantity: e.quantity,
                    unit_price_cents: e.unit_price_cents,
                    reason: None,
                    occurred_at: e.occurred_at,
                });
            }
            StockItemEvent::ExitRecorded(e) => {
                self.movements.push(StockMovement {
                    movement_id: envelope.event_id(),
                    item_id: e.item_id,
                    kind: MovementKind::Out,
                    quantity: e.quantity,
                    unit_price_cents: None,
                    reason: Some(e.reason),
                    occurred_at: e.occurred_at,
                });
            }
            // Registration, detail edits and retirement are not movements.
            StockItemEvent::ItemRegistered(_)
            | StockItemEvent::DetailsUpdated(_)
            | StockItemEvent::ItemRetired(_) => {}
        }
    }
}
