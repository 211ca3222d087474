//! Activity log: who did what, when.
//!
//! The action kind is a closed enum matched exhaustively, never a free-form
//! string, so adding a new auditable operation is a compile-time checklist
//! rather than a runtime surprise.

pub mod log;

pub use log::{ActivityAction, ActivityEntry, ActivityLog};
