use crate::{Event, EventEnvelope};

/// A projection builds a read model from an append-only event stream.
///
/// Read models are disposable: events are the source of truth, and a
/// projection can always be rebuilt from scratch by replaying them. Because
/// delivery is at-least-once, projections must be idempotent: applying the
/// same envelope twice must produce the same read model. The
/// [`ProjectionRunner`](crate::ProjectionRunner) enforces this by tracking
/// sequence numbers per stream and skipping duplicates.
pub trait Projection {
    type Ev: Event;

    /// Apply a single event to the projection, updating the read model.
    ///
    /// Does not return errors: an event that is irrelevant to this
    /// projection is simply ignored. Structured failure handling lives in
    /// the runner.
    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>);
}
