//! Projection runner: cursor-tracked, idempotent event replay.
//!
//! Read models are disposable; events are the source of truth. The runner
//! keeps one cursor per aggregate stream so duplicated deliveries are
//! skipped and gaps are surfaced as errors, without making any storage
//! assumptions.

use std::collections::HashMap;

use thiserror::Error;

use printstock_core::AggregateId;

use crate::{EventEnvelope, Projection};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("stored event has sequence_number=0")]
    ZeroSequence,

    #[error("sequence gap in stream {aggregate_id} (last={last}, found={found})")]
    SequenceGap {
        aggregate_id: AggregateId,
        last: u64,
        found: u64,
    },
}

/// Drives envelopes through a projection while tracking per-stream progress.
#[derive(Debug)]
pub struct ProjectionRunner<P>
where
    P: Projection,
{
    projection: P,
    cursors: HashMap<AggregateId, u64>,
}

impl<P> ProjectionRunner<P>
where
    P: Projection,
{
    pub fn new(projection: P) -> Self {
        Self {
            projection,
            cursors: HashMap::new(),
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn into_projection(self) -> P {
        self.projection
    }

    /// Last applied sequence number for a stream, if any envelope was seen.
    pub fn cursor(&self, aggregate_id: AggregateId) -> Option<u64> {
        self.cursors.get(&aggregate_id).copied()
    }

    /// Apply a single envelope.
    ///
    /// - duplicates (sequence <= cursor) are skipped, so at-least-once
    ///   delivery is safe
    /// - the first envelope of a stream may carry any positive sequence;
    ///   after that, increments must be strictly +1
    pub fn apply(&mut self, envelope: &EventEnvelope<P::Ev>) -> Result<(), ProjectionError> {
        let stream = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if seq == 0 {
            return Err(ProjectionError::ZeroSequence);
        }

        match self.cursors.get(&stream).copied() {
            Some(last) if seq <= last => Ok(()),
            Some(last) if seq != last + 1 => Err(ProjectionError::SequenceGap {
                aggregate_id: stream,
                last,
                found: seq,
            }),
            _ => {
                self.projection.apply(envelope);
                self.cursors.insert(stream, seq);
                Ok(())
            }
        }
    }

    /// Apply many envelopes in order.
    pub fn run<'a>(
        &mut self,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<(), ProjectionError>
    where
        P::Ev: 'a,
    {
        for env in envelopes {
            self.apply(env)?;
        }
        Ok(())
    }

    /// Rebuild a projection from scratch by replaying the full history.
    pub fn rebuild_from_scratch<'a>(
        factory: impl FnOnce() -> P,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<P, ProjectionError>
    where
        P::Ev: 'a,
    {
        let mut runner = ProjectionRunner::new(factory());
        runner.run(envelopes)?;
        Ok(runner.projection)
    }
}
