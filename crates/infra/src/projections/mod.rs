//! Read models built from the event streams.
//!
//! Stored payloads are JSON; each projection decodes them back into its
//! typed event before applying. Read models are disposable and can always be
//! rebuilt by replaying the streams through a
//! [`ProjectionRunner`](printstock_events::ProjectionRunner).

pub mod movement_history;
pub mod stock_levels;

pub use movement_history::MovementHistory;
pub use stock_levels::StockLevels;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use printstock_events::EventEnvelope;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to decode '{aggregate_type}' payload: {message}")]
    Payload {
        aggregate_type: String,
        message: String,
    },
}

/// Decode a stored JSON envelope into its typed counterpart.
pub fn decode_envelope<E: DeserializeOwned>(
    envelope: &EventEnvelope<JsonValue>,
) -> Result<EventEnvelope<E>, DecodeError> {
    let payload: E =
        serde_json::from_value(envelope.payload().clone()).map_err(|e| DecodeError::Payload {
            aggregate_type: envelope.aggregate_type().to_string(),
            message: e.to_string(),
        })?;

    Ok(envelope.clone().map_payload(|_| payload))
}
