//! Posts goods receipts into inventory.
//!
//! When a purchase order records a receipt, every received line becomes a
//! stock entry on its item. The two aggregates stay decoupled: the order only
//! tracks outstanding quantities, inventory only sees ordinary entries.

use printstock_inventory::{RecordEntry, StockItem, StockItemCommand, StockItemId};
use printstock_purchasing::GoodsReceived;

use crate::aggregate_types;
use crate::event_store::{EventStore, StoredEvent};
use crate::executor::{CommandExecutor, ExecuteError};

/// Record one stock entry per received line.
///
/// Lines are posted in order; a failing line aborts the rest, so callers
/// should treat a partial posting as retryable (entries already posted are
/// visible in the item streams).
pub fn post_receipt_entries<S: EventStore>(
    executor: &CommandExecutor<S>,
    receipt: &GoodsReceived,
) -> Result<Vec<StoredEvent>, ExecuteError> {
    let mut committed = Vec::with_capacity(receipt.lines.len());

    for line in &receipt.lines {
        let entries = executor.execute::<StockItem>(
            line.item_id.0,
            aggregate_types::STOCK_ITEM,
            StockItemCommand::RecordEntry(RecordEntry {
                item_id: line.item_id,
                quantity: line.quantity,
                unit_price_cents: None,
                occurred_at: receipt.occurred_at,
            }),
            |id| StockItem::empty(StockItemId::new(id)),
        )?;
        committed.extend(entries);
    }

    tracing::info!(
        order_id = %receipt.order_id.0,
        lines = receipt.lines.len(),
        events = committed.len(),
        "goods receipt posted to inventory"
    );

    Ok(committed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use printstock_core::AggregateId;
    use printstock_inventory::{Category, RegisterItem};
    use printstock_purchasing::{PurchaseOrderId, ReceivedLine};

    use crate::event_store::InMemoryEventStore;

    fn registered_item(
        executor: &CommandExecutor<InMemoryEventStore>,
        name: &str,
        initial: i64,
    ) -> StockItemId {
        let item_id = StockItemId::new(AggregateId::new());
        executor
            .execute::<StockItem>(
                item_id.0,
                aggregate_types::STOCK_ITEM,
                StockItemCommand::RegisterItem(RegisterItem {
                    item_id,
                    name: name.to_string(),
                    brand: "Brother".to_string(),
                    category: Category::Toner,
                    initial_quantity: initial,
                    min_quantity: 2,
                    occurred_at: Utc::now(),
                }),
                |id| StockItem::empty(StockItemId::new(id)),
            )
            .unwrap();
        item_id
    }

    #[test]
    fn each_line_becomes_a_stock_entry() {
        let executor = CommandExecutor::new(InMemoryEventStore::new());
        let toner = registered_item(&executor, "TN-2370", 1);
        let drum = registered_item(&executor, "DR-2340", 0);

        let receipt = GoodsReceived {
            order_id: PurchaseOrderId::new(AggregateId::new()),
            lines: vec![
                ReceivedLine {
                    line_no: 1,
                    item_id: toner,
                    quantity: 4,
                },
                ReceivedLine {
                    line_no: 2,
                    item_id: drum,
                    quantity: 2,
                },
            ],
            occurred_at: Utc::now(),
        };

        let committed = post_receipt_entries(&executor, &receipt).unwrap();
        assert_eq!(committed.len(), 2);
        assert!(committed
            .iter()
            .all(|e| e.event_type == "inventory.item.entry_recorded"));
    }

    #[test]
    fn unknown_items_fail_the_posting() {
        let executor = CommandExecutor::new(InMemoryEventStore::new());

        let receipt = GoodsReceived {
            order_id: PurchaseOrderId::new(AggregateId::new()),
            lines: vec![ReceivedLine {
                line_no: 1,
                item_id: StockItemId::new(AggregateId::new()),
                quantity: 3,
            }],
            occurred_at: Utc::now(),
        };

        let err = post_receipt_entries(&executor, &receipt).unwrap_err();
        assert!(matches!(err, ExecuteError::NotFound));
    }
}
