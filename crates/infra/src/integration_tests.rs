//! End-to-end flows: commands through the executor, streams replayed into
//! read models, analytics computed from the read models.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};

use printstock_activity::{ActivityAction, ActivityLog};
use printstock_core::{AggregateId, UserId};
use printstock_events::ProjectionRunner;
use printstock_forecast::{
    DaysRemaining, ForecastParams, Priority, SuggestionParams, consumption_forecast,
    order_suggestions, stock_summary,
};
use printstock_inventory::{
    Category, ExitReason, RecordEntry, RecordExit, RegisterItem, RetireItem, StockItem,
    StockItemCommand, StockItemEvent, StockItemId,
};
use printstock_purchasing::{
    AddLine, OpenOrder, OrderStatus, PurchaseOrder, PurchaseOrderCommand, PurchaseOrderEvent,
    PurchaseOrderId, ReceivedLine, RecordReceipt, SubmitOrder,
};

use crate::aggregate_types;
use crate::event_store::{EventStore, InMemoryEventStore};
use crate::executor::CommandExecutor;
use crate::projections::{MovementHistory, StockLevels, decode_envelope};
use crate::receipts::post_receipt_entries;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
}

fn execute_item(
    executor: &CommandExecutor<InMemoryEventStore>,
    item_id: StockItemId,
    command: StockItemCommand,
) -> Result<()> {
    executor.execute::<StockItem>(item_id.0, aggregate_types::STOCK_ITEM, command, |id| {
        StockItem::empty(StockItemId::new(id))
    })?;
    Ok(())
}

fn register(
    executor: &CommandExecutor<InMemoryEventStore>,
    name: &str,
    category: Category,
    initial: i64,
    min: i64,
    at: DateTime<Utc>,
) -> Result<StockItemId> {
    let item_id = StockItemId::new(AggregateId::new());
    execute_item(
        executor,
        item_id,
        StockItemCommand::RegisterItem(RegisterItem {
            item_id,
            name: name.to_string(),
            brand: "Ricoh".to_string(),
            category,
            initial_quantity: initial,
            min_quantity: min,
            occurred_at: at,
        }),
    )?;
    Ok(item_id)
}

/// Replay the given item streams into both read models.
fn replay_items(
    store: &InMemoryEventStore,
    item_ids: &[StockItemId],
) -> Result<(StockLevels, MovementHistory)> {
    let mut levels = ProjectionRunner::new(StockLevels::new());
    let mut history = ProjectionRunner::new(MovementHistory::new());

    for item_id in item_ids {
        for stored in store.load_stream(item_id.0)? {
            let envelope = decode_envelope::<StockItemEvent>(&stored.to_envelope())?;
            levels.apply(&envelope)?;
            history.apply(&envelope)?;
        }
    }

    Ok((levels.into_projection(), history.into_projection()))
}

#[test]
fn movements_flow_from_commands_to_forecast() -> Result<()> {
    let executor = CommandExecutor::new(InMemoryEventStore::new());
    let now = fixed_now();

    // Steady consumer: starts at 100, burns 10/day over the last 10 days.
    let toner = register(&executor, "TEC TN4510", Category::Toner, 400, 5, now)?;
    for day in 1..=10 {
        execute_item(
            &executor,
            toner,
            StockItemCommand::RecordExit(RecordExit {
                item_id: toner,
                quantity: 30,
                reason: ExitReason::Consumption,
                occurred_at: now - Duration::days(day),
            }),
        )?;
    }

    // Untouched drum unit: no consumption at all.
    let drum = register(&executor, "TEC DR4510", Category::DrumUnit, 5, 2, now)?;

    let (levels, history) = replay_items(executor.store(), &[toner, drum])?;

    assert_eq!(levels.get(toner).map(|i| i.quantity), Some(100));
    assert_eq!(history.for_item(toner).count(), 10);

    let reports = consumption_forecast(
        &levels.snapshot(),
        history.movements(),
        &ForecastParams::default(),
        now,
    );

    let toner_report = reports
        .iter()
        .find(|r| r.item_id == toner)
        .ok_or_else(|| anyhow::anyhow!("missing toner report"))?;
    assert!((toner_report.daily_consumption_rate - 10.0).abs() < 1e-9);
    assert_eq!(toner_report.days_remaining, DaysRemaining::Finite(10));
    assert!(!toner_report.is_critical);

    let drum_report = reports
        .iter()
        .find(|r| r.item_id == drum)
        .ok_or_else(|| anyhow::anyhow!("missing drum report"))?;
    assert!(drum_report.days_remaining.is_unbounded());

    Ok(())
}

#[test]
fn suggestions_and_summary_reflect_replayed_levels() -> Result<()> {
    let executor = CommandExecutor::new(InMemoryEventStore::new());
    let now = fixed_now();

    let healthy = register(&executor, "TEC TN4510", Category::Toner, 20, 5, now)?;
    let low = register(&executor, "TEC TN280", Category::Toner, 2, 6, now)?;
    let empty = register(&executor, "TEC DR2340", Category::DrumUnit, 3, 2, now)?;
    execute_item(
        &executor,
        empty,
        StockItemCommand::RecordExit(RecordExit {
            item_id: empty,
            quantity: 3,
            reason: ExitReason::Consumption,
            occurred_at: now - Duration::days(1),
        }),
    )?;

    let (levels, _) = replay_items(executor.store(), &[healthy, low, empty])?;
    let snapshot = levels.snapshot();

    let summary = stock_summary(&snapshot);
    assert_eq!(summary.total_units, 22);
    assert_eq!(summary.low_stock_items, 1);
    assert_eq!(summary.out_of_stock_items, 1);

    let suggestions = order_suggestions(&snapshot, &SuggestionParams::default());
    assert_eq!(suggestions.len(), 2);

    // Out-of-stock outranks merely-low.
    assert_eq!(suggestions[0].item_id, empty);
    assert_eq!(suggestions[0].priority, Priority::High);
    assert_eq!(suggestions[0].suggested_quantity, 4);
    assert_eq!(suggestions[1].item_id, low);
    assert_eq!(suggestions[1].suggested_quantity, 10);

    Ok(())
}

#[test]
fn retired_items_leave_the_read_models() -> Result<()> {
    let executor = CommandExecutor::new(InMemoryEventStore::new());
    let now = fixed_now();

    let toner = register(&executor, "TEC TN3442", Category::Toner, 8, 2, now)?;
    execute_item(
        &executor,
        toner,
        StockItemCommand::RetireItem(RetireItem {
            item_id: toner,
            occurred_at: now,
        }),
    )?;

    let (levels, _) = replay_items(executor.store(), &[toner])?;
    assert!(levels.is_empty());
    assert!(consumption_forecast(&levels.snapshot(), &[], &ForecastParams::default(), now).is_empty());

    // The stream itself keeps the full history.
    assert_eq!(executor.store().load_stream(toner.0)?.len(), 2);

    Ok(())
}

#[test]
fn goods_receipts_raise_stock_levels() -> Result<()> {
    let executor = CommandExecutor::new(InMemoryEventStore::new());
    let now = fixed_now();

    let toner = register(&executor, "TEC TN2370", Category::Toner, 1, 3, now)?;
    let order_id = PurchaseOrderId::new(AggregateId::new());

    let run_order = |command: PurchaseOrderCommand| {
        executor.execute::<PurchaseOrder>(
            order_id.0,
            aggregate_types::PURCHASE_ORDER,
            command,
            |id| PurchaseOrder::empty(PurchaseOrderId::new(id)),
        )
    };

    run_order(PurchaseOrderCommand::OpenOrder(OpenOrder {
        order_id,
        supplier: "PrintParts Ltda".to_string(),
        occurred_at: now,
    }))?;
    run_order(PurchaseOrderCommand::AddLine(AddLine {
        order_id,
        item_id: toner,
        quantity: 10,
        occurred_at: now,
    }))?;
    run_order(PurchaseOrderCommand::SubmitOrder(SubmitOrder {
        order_id,
        occurred_at: now,
    }))?;

    let committed = run_order(PurchaseOrderCommand::RecordReceipt(RecordReceipt {
        order_id,
        receipts: vec![ReceivedLine {
            line_no: 1,
            item_id: toner,
            quantity: 6,
        }],
        occurred_at: now,
    }))?;

    // Feed each GoodsReceived to the inventory side.
    for stored in &committed {
        let envelope = decode_envelope::<PurchaseOrderEvent>(&stored.to_envelope())?;
        if let PurchaseOrderEvent::GoodsReceived(receipt) = envelope.payload() {
            post_receipt_entries(&executor, receipt)?;
        }
    }

    let (levels, history) = replay_items(executor.store(), &[toner])?;
    assert_eq!(levels.get(toner).map(|i| i.quantity), Some(7));
    assert_eq!(history.for_item(toner).count(), 1);

    // The order itself is only partially received.
    let order_stream = executor.store().load_stream(order_id.0)?;
    let mut order = PurchaseOrder::empty(order_id);
    for stored in &order_stream {
        let ev: PurchaseOrderEvent = serde_json::from_value(stored.payload.clone())?;
        printstock_core::Aggregate::apply(&mut order, &ev);
    }
    assert_eq!(order.status(), OrderStatus::PartiallyReceived);
    assert_eq!(order.lines()[0].outstanding(), 4);

    Ok(())
}

#[test]
fn activity_log_mirrors_the_session() -> Result<()> {
    let executor = CommandExecutor::new(InMemoryEventStore::new());
    let now = fixed_now();
    let operator = UserId::new();
    let mut log = ActivityLog::new();

    let toner = register(&executor, "TEC TN4510", Category::Toner, 10, 3, now)?;
    log.record(
        operator,
        Some("Ana".to_string()),
        ActivityAction::ItemRegistered {
            item_id: toner,
            name: "TEC TN4510".to_string(),
        },
        now,
    );

    execute_item(
        &executor,
        toner,
        StockItemCommand::RecordEntry(RecordEntry {
            item_id: toner,
            quantity: 5,
            unit_price_cents: Some(250_00),
            occurred_at: now,
        }),
    )?;
    log.record(
        operator,
        Some("Ana".to_string()),
        ActivityAction::EntryRecorded {
            item_id: toner,
            quantity: 5,
        },
        now,
    );

    assert_eq!(log.entries().len(), 2);
    assert_eq!(log.by_user(operator).count(), 2);
    assert_eq!(log.by_kind("inventory.entry_recorded").count(), 1);

    let (levels, _) = replay_items(executor.store(), &[toner])?;
    assert_eq!(levels.get(toner).map(|i| i.quantity), Some(15));

    Ok(())
}
