use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printstock_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use printstock_events::Event;
use printstock_inventory::StockItemId;

/// Purchase order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(pub AggregateId);

impl PurchaseOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PurchaseOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Purchase order status lifecycle.
///
/// `Cancelled` is reachable from every state except `Received`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Sent,
    PartiallyReceived,
    Received,
    Cancelled,
}

/// Purchase order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub item_id: StockItemId,
    pub quantity_ordered: i64,
    /// Cumulative; never exceeds `quantity_ordered`.
    pub quantity_received: i64,
}

impl OrderLine {
    pub fn is_fully_received(&self) -> bool {
        self.quantity_received >= self.quantity_ordered
    }

    pub fn outstanding(&self) -> i64 {
        self.quantity_ordered - self.quantity_received
    }
}

/// One line's worth of goods arriving in a single receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedLine {
    pub line_no: u32,
    pub item_id: StockItemId,
    /// Delta received now, not the cumulative total.
    pub quantity: i64,
}

/// Aggregate root: PurchaseOrder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    supplier: String,
    status: OrderStatus,
    lines: Vec<OrderLine>,
    version: u64,
    opened: bool,
}

impl PurchaseOrder {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: PurchaseOrderId) -> Self {
        Self {
            id,
            supplier: String::new(),
            status: OrderStatus::Draft,
            lines: Vec::new(),
            version: 0,
            opened: false,
        }
    }

    pub fn id_typed(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    fn line(&self, line_no: u32) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.line_no == line_no)
    }
}

impl AggregateRoot for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order_id: PurchaseOrderId,
    pub supplier: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddLine (only allowed in Draft).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLine {
    pub order_id: PurchaseOrderId,
    pub item_id: StockItemId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitOrder (Draft with at least one line → Sent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrder {
    pub order_id: PurchaseOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordReceipt (per-line received deltas).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReceipt {
    pub order_id: PurchaseOrderId,
    pub receipts: Vec<ReceivedLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: PurchaseOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderCommand {
    OpenOrder(OpenOrder),
    AddLine(AddLine),
    SubmitOrder(SubmitOrder),
    RecordReceipt(RecordReceipt),
    CancelOrder(CancelOrder),
}

/// Event: OrderOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOpened {
    pub order_id: PurchaseOrderId,
    pub supplier: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub order_id: PurchaseOrderId,
    pub line_no: u32,
    pub item_id: StockItemId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    pub order_id: PurchaseOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: GoodsReceived.
///
/// Carries the per-line deltas of one receipt so an infrastructure handler
/// can post a matching stock entry per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceived {
    pub order_id: PurchaseOrderId,
    pub lines: Vec<ReceivedLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: PurchaseOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderEvent {
    OrderOpened(OrderOpened),
    LineAdded(LineAdded),
    OrderSubmitted(OrderSubmitted),
    GoodsReceived(GoodsReceived),
    OrderCancelled(OrderCancelled),
}

impl Event for PurchaseOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PurchaseOrderEvent::OrderOpened(_) => "purchasing.order.opened",
            PurchaseOrderEvent::LineAdded(_) => "purchasing.order.line_added",
            PurchaseOrderEvent::OrderSubmitted(_) => "purchasing.order.submitted",
            PurchaseOrderEvent::GoodsReceived(_) => "purchasing.order.goods_received",
            PurchaseOrderEvent::OrderCancelled(_) => "purchasing.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PurchaseOrderEvent::OrderOpened(e) => e.occurred_at,
            PurchaseOrderEvent::LineAdded(e) => e.occurred_at,
            PurchaseOrderEvent::OrderSubmitted(e) => e.occurred_at,
            PurchaseOrderEvent::GoodsReceived(e) => e.occurred_at,
            PurchaseOrderEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for PurchaseOrder {
    type Command = PurchaseOrderCommand;
    type Event = PurchaseOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PurchaseOrderEvent::OrderOpened(e) => {
                self.id = e.order_id;
                self.supplier = e.supplier.clone();
                self.status = OrderStatus::Draft;
                self.lines.clear();
                self.opened = true;
            }
            PurchaseOrderEvent::LineAdded(e) => {
                self.lines.push(OrderLine {
                    line_no: e.line_no,
                    item_id: e.item_id,
                    quantity_ordered: e.quantity,
                    quantity_received: 0,
                });
            }
            PurchaseOrderEvent::OrderSubmitted(_) => {
                self.status = OrderStatus::Sent;
            }
            PurchaseOrderEvent::GoodsReceived(e) => {
                for received in &e.lines {
                    if let Some(line) =
                        self.lines.iter_mut().find(|l| l.line_no == received.line_no)
                    {
                        line.quantity_received += received.quantity;
                    }
                }
                self.status = if self.lines.iter().all(OrderLine::is_fully_received) {
                    OrderStatus::Received
                } else {
                    OrderStatus::PartiallyReceived
                };
            }
            PurchaseOrderEvent::OrderCancelled(_) => {
                self.status = OrderStatus::Cancelled;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PurchaseOrderCommand::OpenOrder(cmd) => self.handle_open(cmd),
            PurchaseOrderCommand::AddLine(cmd) => self.handle_add_line(cmd),
            PurchaseOrderCommand::SubmitOrder(cmd) => self.handle_submit(cmd),
            PurchaseOrderCommand::RecordReceipt(cmd) => self.handle_receipt(cmd),
            PurchaseOrderCommand::CancelOrder(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl PurchaseOrder {
    fn ensure_order(&self, order_id: PurchaseOrderId) -> Result<(), DomainError> {
        if !self.opened {
            return Err(DomainError::not_found());
        }
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenOrder) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        if self.opened {
            return Err(DomainError::conflict("purchase order already exists"));
        }
        if cmd.supplier.trim().is_empty() {
            return Err(DomainError::validation("supplier cannot be empty"));
        }

        Ok(vec![PurchaseOrderEvent::OrderOpened(OrderOpened {
            order_id: cmd.order_id,
            supplier: cmd.supplier.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddLine) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        self.ensure_order(cmd.order_id)?;

        if self.status != OrderStatus::Draft {
            return Err(DomainError::invariant(
                "lines can only be added to draft orders",
            ));
        }
        if cmd.quantity <= 0 {
            return Err(DomainError::validation("ordered quantity must be positive"));
        }
        if self.lines.iter().any(|l| l.item_id == cmd.item_id) {
            return Err(DomainError::conflict("item already has a line on this order"));
        }

        let next_line_no = (self.lines.len() as u32) + 1;
        Ok(vec![PurchaseOrderEvent::LineAdded(LineAdded {
            order_id: cmd.order_id,
            line_no: next_line_no,
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit(&self, cmd: &SubmitOrder) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        self.ensure_order(cmd.order_id)?;

        if self.status != OrderStatus::Draft {
            return Err(DomainError::invariant("only draft orders can be submitted"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "cannot submit a purchase order without lines",
            ));
        }

        Ok(vec![PurchaseOrderEvent::OrderSubmitted(OrderSubmitted {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_receipt(&self, cmd: &RecordReceipt) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        self.ensure_order(cmd.order_id)?;

        if !matches!(
            self.status,
            OrderStatus::Sent | OrderStatus::PartiallyReceived
        ) {
            return Err(DomainError::invariant(
                "goods can only be received on a sent order",
            ));
        }
        if cmd.receipts.is_empty() {
            return Err(DomainError::validation("receipt contains no lines"));
        }

        for received in &cmd.receipts {
            let line = self.line(received.line_no).ok_or_else(|| {
                DomainError::validation(format!("unknown line_no {}", received.line_no))
            })?;

            if received.item_id != line.item_id {
                return Err(DomainError::invariant(format!(
                    "line {} item mismatch",
                    received.line_no
                )));
            }
            if received.quantity <= 0 {
                return Err(DomainError::validation(
                    "received quantity must be positive",
                ));
            }
            if received.quantity > line.outstanding() {
                return Err(DomainError::invariant(format!(
                    "line {}: receiving {} exceeds outstanding {}",
                    received.line_no,
                    received.quantity,
                    line.outstanding()
                )));
            }
        }

        Ok(vec![PurchaseOrderEvent::GoodsReceived(GoodsReceived {
            order_id: cmd.order_id,
            lines: cmd.receipts.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelOrder) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        self.ensure_order(cmd.order_id)?;

        match self.status {
            OrderStatus::Received => Err(DomainError::invariant(
                "a fully received order cannot be cancelled",
            )),
            OrderStatus::Cancelled => {
                Err(DomainError::conflict("order is already cancelled"))
            }
            _ => Ok(vec![PurchaseOrderEvent::OrderCancelled(OrderCancelled {
                order_id: cmd.order_id,
                occurred_at: cmd.occurred_at,
            })]),
        }
    }
}
