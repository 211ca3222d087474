//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared entirely by their attribute
/// values: a movement kind or an exit reason is the same value wherever it
/// appears. "Modifying" one means constructing a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
