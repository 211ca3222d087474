//! Inventory domain module (event-sourced).
//!
//! Business rules for stock items and their movements, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). The item's
//! current quantity is always the initial registered quantity plus the
//! running sum of entries minus exits.

pub mod item;
pub mod movement;

pub use item::{
    DetailsUpdated, EntryRecorded, ExitRecorded, ItemRegistered, ItemRetired, RecordEntry,
    RecordExit, RegisterItem, RetireItem, StockItem, StockItemCommand, StockItemEvent,
    StockItemId, UpdateDetails,
};
pub use movement::{Category, ExitReason, MovementKind, StockMovement};
