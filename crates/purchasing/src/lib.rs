//! Purchasing domain module (event-sourced).
//!
//! Purchase orders move through draft → sent → (partially) received, with
//! cancellation possible until goods arrive. Receiving is per line and
//! cumulative; `GoodsReceived` events carry the deltas an infrastructure
//! handler turns into stock entries.

pub mod order;

pub use order::{
    AddLine, CancelOrder, GoodsReceived, LineAdded, OpenOrder, OrderCancelled, OrderLine,
    OrderOpened, OrderStatus, OrderSubmitted, PurchaseOrder, PurchaseOrderCommand,
    PurchaseOrderEvent, PurchaseOrderId, ReceivedLine, RecordReceipt, SubmitOrder,
};
