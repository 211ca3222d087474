//! Consumption forecaster.
//!
//! Given the current item snapshots and a trailing window of movement
//! history, compute a daily average consumption rate per item and project
//! days until depletion, flagging items that will run out within the
//! critical threshold. Single pass over the movements, deterministic, and
//! total over well-formed input.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use printstock_inventory::{MovementKind, StockItemId, StockMovement};

use crate::snapshot::ItemSnapshot;

/// Forecast tuning knobs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastParams {
    /// Trailing window (days) over which consumption is averaged.
    pub analysis_window_days: u32,
    /// Items projected to deplete in fewer days than this are critical.
    pub critical_threshold_days: u32,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            analysis_window_days: 30,
            critical_threshold_days: 7,
        }
    }
}

impl ForecastParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analysis_window_days(mut self, days: u32) -> Self {
        self.analysis_window_days = days;
        self
    }

    pub fn with_critical_threshold_days(mut self, days: u32) -> Self {
        self.critical_threshold_days = days;
        self
    }
}

/// Projected runway for one item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaysRemaining {
    /// Whole days until the current stock reaches zero at the observed rate
    /// (floor-truncated, never rounded up).
    Finite(i64),
    /// No consumption observed in the window; the stock never runs out at
    /// the current rate.
    Unbounded,
}

impl DaysRemaining {
    pub fn finite(self) -> Option<i64> {
        match self {
            DaysRemaining::Finite(d) => Some(d),
            DaysRemaining::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, DaysRemaining::Unbounded)
    }
}

/// Per-item forecast record. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub item_id: StockItemId,
    /// `"name (brand)"`, ready for display.
    pub item_label: String,
    pub current_quantity: i64,
    /// Average units consumed per day over the analysis window.
    pub daily_consumption_rate: f64,
    pub days_remaining: DaysRemaining,
    /// `None` when `days_remaining` is unbounded, or when the projected date
    /// overflows the calendar.
    pub estimated_depletion: Option<NaiveDate>,
    pub is_critical: bool,
}

/// Compute one forecast record per item that currently has positive stock.
///
/// - `now` is passed explicitly so the computation is deterministic; callers
///   supply `Utc::now()`.
/// - A movement timestamped exactly at `now - analysis_window_days` is
///   inside the window; anything earlier is not.
/// - Every `Out` movement counts toward the rate regardless of its reason
///   code. Whether returns should predict future consumption the way
///   genuine usage does is an open modeling question; the observed behavior
///   is kept as-is rather than silently changed.
/// - Items with zero stock are excluded: the out-of-stock alerting path
///   covers them, not the forecaster.
///
/// Output order is unspecified; callers partition by `is_critical`.
pub fn consumption_forecast(
    items: &[ItemSnapshot],
    movements: &[StockMovement],
    params: &ForecastParams,
    now: DateTime<Utc>,
) -> Vec<ForecastReport> {
    // A zero window would divide by zero; clamp rather than fail, since the
    // function is total over well-formed input.
    let window_days = params.analysis_window_days.max(1);
    // A window too large to subtract from `now` covers all history.
    let cutoff = now.checked_sub_signed(Duration::days(i64::from(window_days)));

    // Total units that left the shelf inside the window, per item.
    let mut consumed: HashMap<StockItemId, i64> = HashMap::new();
    for movement in movements {
        if movement.kind == MovementKind::Out
            && cutoff.is_none_or(|cutoff| movement.occurred_at >= cutoff)
        {
            *consumed.entry(movement.item_id).or_insert(0) += movement.quantity;
        }
    }

    let today = now.date_naive();
    let threshold = i64::from(params.critical_threshold_days);

    items
        .iter()
        .filter(|item| item.quantity > 0)
        .map(|item| {
            let total = consumed.get(&item.item_id).copied().unwrap_or(0);
            let mut rate = total as f64 / f64::from(window_days);
            if !rate.is_finite() || rate < 0.0 {
                rate = 0.0;
            }

            let (days_remaining, estimated_depletion) = if rate <= 0.0 {
                (DaysRemaining::Unbounded, None)
            } else {
                // Conservative runway: floor, never round up. A runway too
                // far out for the calendar just has no depletion date.
                let days = (item.quantity as f64 / rate).floor() as i64;
                let depletion =
                    Duration::try_days(days).and_then(|d| today.checked_add_signed(d));
                (DaysRemaining::Finite(days), depletion)
            };

            let is_critical = matches!(
                days_remaining,
                DaysRemaining::Finite(d) if d > 0 && d < threshold
            );

            ForecastReport {
                item_id: item.item_id,
                item_label: item.label(),
                current_quantity: item.quantity,
                daily_consumption_rate: rate,
                days_remaining,
                estimated_depletion,
                is_critical,
            }
        })
        .collect()
}
