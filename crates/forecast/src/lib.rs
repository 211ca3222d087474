//! Stock analytics: consumption forecasting, order suggestions, and summary
//! statistics.
//!
//! Everything in this crate is a pure computation over read-model snapshots:
//! no IO, no caching, no shared state. Callers re-run the functions with
//! fresh inputs whenever their snapshots change.

pub mod consumption;
pub mod replenishment;
pub mod snapshot;
pub mod summary;

pub use consumption::{DaysRemaining, ForecastParams, ForecastReport, consumption_forecast};
pub use replenishment::{OrderSuggestion, Priority, SuggestionParams, order_suggestions};
pub use snapshot::ItemSnapshot;
pub use summary::{StockSummary, stock_summary};
