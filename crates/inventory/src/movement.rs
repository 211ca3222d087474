//! Movement model: the value types shared by the aggregate, the read models
//! and the forecaster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use printstock_core::{Entity, ValueObject};

use crate::item::StockItemId;

/// Supply category. Closed set: this operation stocks toner cartridges and
/// drum units, nothing else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Toner,
    DrumUnit,
}

impl ValueObject for Category {}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Category::Toner => f.write_str("toner"),
            Category::DrumUnit => f.write_str("drum-unit"),
        }
    }
}

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
}

impl ValueObject for MovementKind {}

/// Why stock left the shelf.
///
/// A `Return` is an exit caused by sending a defective unit back, not by
/// consumption.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitReason {
    Consumption,
    Return,
}

impl ValueObject for ExitReason {}

/// A single recorded stock change, as exposed by the movement-history read
/// model and consumed by the forecaster.
///
/// Timestamps are structured (`chrono`); locale formatting is strictly a
/// display concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// The originating event id.
    pub movement_id: Uuid,
    pub item_id: StockItemId,
    pub kind: MovementKind,
    /// Always positive; direction is carried by `kind`.
    pub quantity: i64,
    /// Acquisition price, entries only.
    pub unit_price_cents: Option<i64>,
    /// Exit reason, exits only.
    pub reason: Option<ExitReason>,
    pub occurred_at: DateTime<Utc>,
}

impl Entity for StockMovement {
    type Id = Uuid;

    fn id(&self) -> &Self::Id {
        &self.movement_id
    }
}
