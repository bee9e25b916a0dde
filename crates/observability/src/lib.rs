//! Tracing/logging setup shared by the binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, ObservabilityConfig};

/// Initialize process-wide tracing with `config`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &ObservabilityConfig) {
    self::tracing::init(config);
}
