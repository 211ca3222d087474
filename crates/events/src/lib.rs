//! Domain event plumbing: the event contract, stream envelopes, and the
//! projection runner used to build read models.

pub mod envelope;
pub mod event;
pub mod projection;
pub mod runner;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use projection::Projection;
pub use runner::{ProjectionError, ProjectionRunner};
