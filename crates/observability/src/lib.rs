//! Tracing/logging (shared setup).

/// Tracing configuration (filters, formatting).
pub mod tracing;

/// Initialize process-wide observability.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}
