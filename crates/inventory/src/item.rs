use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printstock_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use printstock_events::Event;

use crate::movement::{Category, ExitReason};

/// Stock item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockItemId(pub AggregateId);

impl StockItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for StockItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: StockItem.
///
/// Quantity only ever changes through recorded movements (entries and
/// exits); the exit handler rejects anything that would drive it negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    id: StockItemId,
    name: String,
    brand: String,
    category: Category,
    quantity: i64,
    min_quantity: i64,
    version: u64,
    registered: bool,
    retired: bool,
}

impl StockItem {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: StockItemId) -> Self {
        Self {
            id,
            name: String::new(),
            brand: String::new(),
            category: Category::Toner,
            quantity: 0,
            min_quantity: 0,
            version: 0,
            registered: false,
            retired: false,
        }
    }

    pub fn id_typed(&self) -> StockItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn min_quantity(&self) -> i64 {
        self.min_quantity
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

impl AggregateRoot for StockItem {
    type Id = StockItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterItem {
    pub item_id: StockItemId,
    pub name: String,
    pub brand: String,
    pub category: Category,
    pub initial_quantity: i64,
    pub min_quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordEntry (stock in, optionally priced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub item_id: StockItemId,
    pub quantity: i64,
    pub unit_price_cents: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordExit (stock out, with a reason).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExit {
    pub item_id: StockItemId,
    pub quantity: i64,
    pub reason: ExitReason,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails (name/brand/min quantity; never the stock count).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub item_id: StockItemId,
    pub name: String,
    pub brand: String,
    pub min_quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RetireItem (removes the item from every active list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetireItem {
    pub item_id: StockItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockItemCommand {
    RegisterItem(RegisterItem),
    RecordEntry(RecordEntry),
    RecordExit(RecordExit),
    UpdateDetails(UpdateDetails),
    RetireItem(RetireItem),
}

/// Event: ItemRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRegistered {
    pub item_id: StockItemId,
    pub name: String,
    pub brand: String,
    pub category: Category,
    pub initial_quantity: i64,
    pub min_quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EntryRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecorded {
    pub item_id: StockItemId,
    pub quantity: i64,
    pub unit_price_cents: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ExitRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRecorded {
    pub item_id: StockItemId,
    pub quantity: i64,
    pub reason: ExitReason,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DetailsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsUpdated {
    pub item_id: StockItemId,
    pub name: String,
    pub brand: String,
    pub min_quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRetired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRetired {
    pub item_id: StockItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockItemEvent {
    ItemRegistered(ItemRegistered),
    EntryRecorded(EntryRecorded),
    ExitRecorded(ExitRecorded),
    DetailsUpdated(DetailsUpdated),
    ItemRetired(ItemRetired),
}

impl StockItemEvent {
    pub fn item_id(&self) -> StockItemId {
        match self {
            StockItemEvent::ItemRegistered(e) => e.item_id,
            StockItemEvent::EntryRecorded(e) => e.item_id,
            StockItemEvent::ExitRecorded(e) => e.item_id,
            StockItemEvent::DetailsUpdated(e) => e.item_id,
            StockItemEvent::ItemRetired(e) => e.item_id,
        }
    }
}

impl Event for StockItemEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockItemEvent::ItemRegistered(_) => "inventory.item.registered",
            StockItemEvent::EntryRecorded(_) => "inventory.item.entry_recorded",
            StockItemEvent::ExitRecorded(_) => "inventory.item.exit_recorded",
            StockItemEvent::DetailsUpdated(_) => "inventory.item.details_updated",
            StockItemEvent::ItemRetired(_) => "inventory.item.retired",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockItemEvent::ItemRegistered(e) => e.occurred_at,
            StockItemEvent::EntryRecorded(e) => e.occurred_at,
            StockItemEvent::ExitRecorded(e) => e.occurred_at,
            StockItemEvent::DetailsUpdated(e) => e.occurred_at,
            StockItemEvent::ItemRetired(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockItem {
    type Command = StockItemCommand;
    type Event = StockItemEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockItemEvent::ItemRegistered(e) => {
                self.id = e.item_id;
                self.name = e.name.clone();
                self.brand = e.brand.clone();
                self.category = e.category;
                self.quantity = e.initial_quantity;
                self.min_quantity = e.min_quantity;
                self.registered = true;
                self.retired = false;
            }
            StockItemEvent::EntryRecorded(e) => {
                self.quantity += e.quantity;
            }
            StockItemEvent::ExitRecorded(e) => {
                self.quantity -= e.quantity;
            }
            StockItemEvent::DetailsUpdated(e) => {
                self.name = e.name.clone();
                self.brand = e.brand.clone();
                self.min_quantity = e.min_quantity;
            }
            StockItemEvent::ItemRetired(_) => {
                self.retired = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockItemCommand::RegisterItem(cmd) => self.handle_register(cmd),
            StockItemCommand::RecordEntry(cmd) => self.handle_entry(cmd),
            StockItemCommand::RecordExit(cmd) => self.handle_exit(cmd),
            StockItemCommand::UpdateDetails(cmd) => self.handle_update(cmd),
            StockItemCommand::RetireItem(cmd) => self.handle_retire(cmd),
        }
    }
}

impl StockItem {
    fn ensure_active(&self, item_id: StockItemId) -> Result<(), DomainError> {
        if !self.registered || self.retired {
            return Err(DomainError::not_found());
        }
        if self.id != item_id {
            return Err(DomainError::invariant("item_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterItem) -> Result<Vec<StockItemEvent>, DomainError> {
        if self.registered {
            return Err(DomainError::conflict("item already registered"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.initial_quantity < 0 {
            return Err(DomainError::validation("initial quantity cannot be negative"));
        }
        if cmd.min_quantity < 0 {
            return Err(DomainError::validation("minimum quantity cannot be negative"));
        }

        Ok(vec![StockItemEvent::ItemRegistered(ItemRegistered {
            item_id: cmd.item_id,
            name: cmd.name.clone(),
            brand: cmd.brand.clone(),
            category: cmd.category,
            initial_quantity: cmd.initial_quantity,
            min_quantity: cmd.min_quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_entry(&self, cmd: &RecordEntry) -> Result<Vec<StockItemEvent>, DomainError> {
        self.ensure_active(cmd.item_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("entry quantity must be positive"));
        }
        if matches!(cmd.unit_price_cents, Some(p) if p < 0) {
            return Err(DomainError::validation("unit price cannot be negative"));
        }

        Ok(vec![StockItemEvent::EntryRecorded(EntryRecorded {
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            unit_price_cents: cmd.unit_price_cents,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_exit(&self, cmd: &RecordExit) -> Result<Vec<StockItemEvent>, DomainError> {
        self.ensure_active(cmd.item_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("exit quantity must be positive"));
        }

        // Invariant: the running sum of entries minus exits never drives the
        // on-hand count below zero.
        if cmd.quantity > self.quantity {
            return Err(DomainError::invariant(format!(
                "exit of {} exceeds current stock of {}",
                cmd.quantity, self.quantity
            )));
        }

        Ok(vec![StockItemEvent::ExitRecorded(ExitRecorded {
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            reason: cmd.reason,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateDetails) -> Result<Vec<StockItemEvent>, DomainError> {
        self.ensure_active(cmd.item_id)?;

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.min_quantity < 0 {
            return Err(DomainError::validation("minimum quantity cannot be negative"));
        }

        Ok(vec![StockItemEvent::DetailsUpdated(DetailsUpdated {
            item_id: cmd.item_id,
            name: cmd.name.clone(),
            brand: cmd.brand.clone(),
            min_quantity: cmd.min_quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_retire(&self, cmd: &RetireItem) -> Result<Vec<StockItemEvent>, DomainError> {
        self.ensure_active(cmd.item_id)?;

        Ok(vec![StockItemEvent::ItemRetired(ItemRetired {
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printstock_core::AggregateId;
    use proptest::prelude::*;

    fn test_item_id() -> StockItemId {
        StockItemId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn registered_item(item_id: StockItemId, initial: i64) -> StockItem {
        let mut item = StockItem::empty(item_id);
        let events = item
            .handle(&StockItemCommand::RegisterItem(RegisterItem {
                item_id,
                name: "TEC TN4510".to_string(),
                brand: "Ricoh".to_string(),
                category: Category::Toner,
                initial_quantity: initial,
                min_quantity: 3,
                occurred_at: test_time(),
            }))
            .unwrap();
        item.apply(&events[0]);
        item
    }

    #[test]
    fn register_emits_item_registered_with_initial_quantity() {
        let item_id = test_item_id();
        let item = StockItem::empty(item_id);

        let events = item
            .handle(&StockItemCommand::RegisterItem(RegisterItem {
                item_id,
                name: "TEC DR4510".to_string(),
                brand: "Ricoh".to_string(),
                category: Category::DrumUnit,
                initial_quantity: 5,
                min_quantity: 3,
                occurred_at: test_time(),
            }))
            .unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            StockItemEvent::ItemRegistered(e) => {
                assert_eq!(e.item_id, item_id);
                assert_eq!(e.category, Category::DrumUnit);
                assert_eq!(e.initial_quantity, 5);
            }
            _ => panic!("Expected ItemRegistered event"),
        }
    }

    #[test]
    fn cannot_register_twice() {
        let item_id = test_item_id();
        let item = registered_item(item_id, 0);

        let err = item
            .handle(&StockItemCommand::RegisterItem(RegisterItem {
                item_id,
                name: "TEC TN280".to_string(),
                brand: "HP".to_string(),
                category: Category::Toner,
                initial_quantity: 0,
                min_quantity: 3,
                occurred_at: test_time(),
            }))
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn entries_and_exits_track_the_running_sum() {
        let item_id = test_item_id();
        let mut item = registered_item(item_id, 2);

        let events = item
            .handle(&StockItemCommand::RecordEntry(RecordEntry {
                item_id,
                quantity: 10,
                unit_price_cents: Some(45_90),
                occurred_at: test_time(),
            }))
            .unwrap();
        item.apply(&events[0]);
        assert_eq!(item.quantity(), 12);

        let events = item
            .handle(&StockItemCommand::RecordExit(RecordExit {
                item_id,
                quantity: 4,
                reason: ExitReason::Consumption,
                occurred_at: test_time(),
            }))
            .unwrap();
        item.apply(&events[0]);
        assert_eq!(item.quantity(), 8);
    }

    #[test]
    fn exit_beyond_stock_is_rejected() {
        let item_id = test_item_id();
        let item = registered_item(item_id, 3);

        let err = item
            .handle(&StockItemCommand::RecordExit(RecordExit {
                item_id,
                quantity: 4,
                reason: ExitReason::Consumption,
                occurred_at: test_time(),
            }))
            .unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn zero_quantity_movements_are_rejected() {
        let item_id = test_item_id();
        let item = registered_item(item_id, 3);

        let entry = item.handle(&StockItemCommand::RecordEntry(RecordEntry {
            item_id,
            quantity: 0,
            unit_price_cents: None,
            occurred_at: test_time(),
        }));
        assert!(matches!(entry, Err(DomainError::Validation(_))));

        let exit = item.handle(&StockItemCommand::RecordExit(RecordExit {
            item_id,
            quantity: 0,
            reason: ExitReason::Return,
            occurred_at: test_time(),
        }));
        assert!(matches!(exit, Err(DomainError::Validation(_))));
    }

    #[test]
    fn update_changes_details_but_not_quantity() {
        let item_id = test_item_id();
        let mut item = registered_item(item_id, 7);

        let events = item
            .handle(&StockItemCommand::UpdateDetails(UpdateDetails {
                item_id,
                name: "TEC TN2340/2370".to_string(),
                brand: "Brother".to_string(),
                min_quantity: 5,
                occurred_at: test_time(),
            }))
            .unwrap();
        item.apply(&events[0]);

        assert_eq!(item.name(), "TEC TN2340/2370");
        assert_eq!(item.min_quantity(), 5);
        assert_eq!(item.quantity(), 7);
    }

    #[test]
    fn retired_items_reject_further_commands() {
        let item_id = test_item_id();
        let mut item = registered_item(item_id, 1);

        let events = item
            .handle(&StockItemCommand::RetireItem(RetireItem {
                item_id,
                occurred_at: test_time(),
            }))
            .unwrap();
        item.apply(&events[0]);
        assert!(item.is_retired());

        let err = item
            .handle(&StockItemCommand::RecordEntry(RecordEntry {
                item_id,
                quantity: 1,
                unit_price_cents: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    proptest! {
        // Any interleaving of accepted entries/exits keeps the on-hand
        // count equal to initial + sum(in) - sum(out), and never negative.
        #[test]
        fn quantity_is_always_the_running_sum(
            initial in 0i64..50,
            moves in prop::collection::vec((prop::bool::ANY, 1i64..20), 0..40),
        ) {
            let item_id = test_item_id();
            let mut item = registered_item(item_id, initial);
            let mut expected = initial;

            for (is_entry, qty) in moves {
                let cmd = if is_entry {
                    StockItemCommand::RecordEntry(RecordEntry {
                        item_id,
                        quantity: qty,
                        unit_price_cents: None,
                        occurred_at: test_time(),
                    })
                } else {
                    StockItemCommand::RecordExit(RecordExit {
                        item_id,
                        quantity: qty,
                        reason: ExitReason::Consumption,
                        occurred_at: test_time(),
                    })
                };

                match item.handle(&cmd) {
                    Ok(events) => {
                        for e in &events {
                            item.apply(e);
                        }
                        expected += if is_entry { qty } else { -qty };
                    }
                    Err(err) => {
                        // Only over-draining exits are refused here.
                        prop_assert!(!is_entry);
                        prop_assert!(qty > expected);
                        prop_assert!(matches!(err, DomainError::InvariantViolation(_)));
                    }
                }

                prop_assert!(item.quantity() >= 0);
                prop_assert_eq!(item.quantity(), expected);
            }
        }
    }
}
