use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printstock_core::UserId;
use printstock_inventory::{ExitReason, StockItemId};
use printstock_purchasing::PurchaseOrderId;

/// Auditable user action with its typed details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityAction {
    ItemRegistered {
        item_id: StockItemId,
        name: String,
    },
    ItemUpdated {
        item_id: StockItemId,
    },
    ItemRetired {
        item_id: StockItemId,
    },
    EntryRecorded {
        item_id: StockItemId,
        quantity: i64,
    },
    ExitRecorded {
        item_id: StockItemId,
        quantity: i64,
        reason: ExitReason,
    },
    OrderOpened {
        order_id: PurchaseOrderId,
        supplier: String,
    },
    OrderSubmitted {
        order_id: PurchaseOrderId,
    },
    ReceiptRecorded {
        order_id: PurchaseOrderId,
        units: i64,
    },
    OrderCancelled {
        order_id: PurchaseOrderId,
    },
}

impl ActivityAction {
    /// Stable discriminant, for filtering and display grouping.
    pub fn kind(&self) -> &'static str {
        match self {
            ActivityAction::ItemRegistered { .. } => "inventory.item_registered",
            ActivityAction::ItemUpdated { .. } => "inventory.item_updated",
            ActivityAction::ItemRetired { .. } => "inventory.item_retired",
            ActivityAction::EntryRecorded { .. } => "inventory.entry_recorded",
            ActivityAction::ExitRecorded { .. } => "inventory.exit_recorded",
            ActivityAction::OrderOpened { .. } => "purchasing.order_opened",
            ActivityAction::OrderSubmitted { .. } => "purchasing.order_submitted",
            ActivityAction::ReceiptRecorded { .. } => "purchasing.receipt_recorded",
            ActivityAction::OrderCancelled { .. } => "purchasing.order_cancelled",
        }
    }
}

/// One log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user_id: UserId,
    /// Profile display name, when the caller knows it.
    pub user_name: Option<String>,
    pub action: ActivityAction,
    pub occurred_at: DateTime<Utc>,
}

/// In-memory, append-only activity log.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        user_id: UserId,
        user_name: Option<String>,
        action: ActivityAction,
        occurred_at: DateTime<Utc>,
    ) {
        self.entries.push(ActivityEntry {
            user_id,
            user_name,
            action,
            occurred_at,
        });
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn by_user(&self, user_id: UserId) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter().filter(move |e| e.user_id == user_id)
    }

    pub fn by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ActivityEntry> {
        self.entries.iter().filter(move |e| e.action.kind() == kind)
    }

    pub fn between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> impl Iterator<Item = &ActivityEntry> {
        self.entries
            .iter()
            .filter(move |e| e.occurred_at >= from && e.occurred_at < until)
    }
}
