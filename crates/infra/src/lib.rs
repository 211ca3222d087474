//! Infrastructure: event storage, command execution, and the read models
//! that feed the analytics functions.
//!
//! Everything here is in-memory and synchronous; the event store trait is
//! the seam where a persistent backend would plug in.

pub mod event_store;
pub mod executor;
pub mod projections;
pub mod receipts;

#[cfg(test)]
mod integration_tests;

pub use event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent};
pub use executor::{CommandExecutor, ExecuteError};
pub use projections::{DecodeError, MovementHistory, StockLevels, decode_envelope};
pub use receipts::post_receipt_entries;

/// Stream type identifiers, one per aggregate.
pub mod aggregate_types {
    pub const STOCK_ITEM: &str = "inventory.item";
    pub const PURCHASE_ORDER: &str = "purchasing.order";
}
