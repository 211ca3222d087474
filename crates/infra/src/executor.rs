//! Command execution pipeline.
//!
//! One consistent lifecycle for every aggregate: load the stream, rehydrate
//! by applying history, let the aggregate decide, then append the decided
//! events with an exact expected version. The executor composes the
//! `EventStore` trait only; callers feed the committed events to whatever
//! projections they maintain.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use printstock_core::{Aggregate, AggregateId, DomainError, ExpectedVersion};

use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Optimistic concurrency failure (stale aggregate version).
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    /// Deterministic domain validation failure.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Deterministic domain invariant failure.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Duplicate creation or similar state conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The addressed aggregate does not exist.
    #[error("not found")]
    NotFound,

    /// Historical payloads could not be decoded into the aggregate's events.
    #[error("failed to deserialize stored event: {0}")]
    Deserialize(String),

    /// The event store refused the operation.
    #[error(transparent)]
    Store(#[from] EventStoreError),
}

impl From<DomainError> for ExecuteError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ExecuteError::Validation(msg),
            DomainError::InvariantViolation(msg) => ExecuteError::InvariantViolation(msg),
            DomainError::InvalidId(msg) => ExecuteError::Validation(msg),
            DomainError::Conflict(msg) => ExecuteError::Conflict(msg),
            DomainError::NotFound => ExecuteError::NotFound,
        }
    }
}

/// Reusable command execution engine for event-sourced aggregates.
#[derive(Debug)]
pub struct CommandExecutor<S> {
    store: S,
}

impl<S> CommandExecutor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> CommandExecutor<S>
where
    S: EventStore,
{
    /// Run one command through load → rehydrate → decide → append.
    ///
    /// The expected version is pinned to the loaded stream's revision, so a
    /// concurrent writer surfaces as `ExecuteError::Concurrency`; callers
    /// retry by re-executing against fresh state.
    ///
    /// The factory builds a blank aggregate for rehydration (e.g.
    /// `StockItem::empty`).
    pub fn execute<A>(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, ExecuteError>
    where
        A: Aggregate<Error = DomainError>,
        A::Event: printstock_events::Event + Serialize + DeserializeOwned,
    {
        let history = self.store.load_stream(aggregate_id)?;
        validate_loaded_stream(aggregate_id, &history)?;
        let expected = ExpectedVersion::Exact(stream_version(&history));

        let mut aggregate = make_aggregate(aggregate_id);
        apply_history::<A>(&mut aggregate, &history)?;

        let decided = aggregate.handle(&command).map_err(ExecuteError::from)?;
        if decided.is_empty() {
            return Ok(vec![]);
        }

        let uncommitted = decided
            .iter()
            .map(|ev| {
                UncommittedEvent::from_typed(aggregate_id, aggregate_type, Uuid::now_v7(), ev)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let committed = self.store.append(uncommitted, expected)?;

        tracing::debug!(
            aggregate_type,
            aggregate_id = %aggregate_id,
            events = committed.len(),
            "command executed"
        );

        Ok(committed)
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(
    aggregate_id: AggregateId,
    stream: &[StoredEvent],
) -> Result<(), ExecuteError> {
    // Guard against a buggy backend returning foreign or reordered events.
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.aggregate_id != aggregate_id {
            return Err(ExecuteError::Store(EventStoreError::InvalidAppend(format!(
                "loaded stream contains wrong aggregate_id at index {idx}"
            ))));
        }
        if e.sequence_number <= last {
            return Err(ExecuteError::Store(EventStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            ))));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: &[StoredEvent]) -> Result<(), ExecuteError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    for stored in history {
        let ev: A::Event = serde_json::from_value(stored.payload.clone())
            .map_err(|e| ExecuteError::Deserialize(e.to_string()))?;
        aggregate.apply(&ev);
    }
    Ok(())
}
