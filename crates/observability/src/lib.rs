//! Tracing and logging setup shared by every binary and test harness.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogConfig, LogFormat};

/// Initialize process-wide tracing with JSON output and `RUST_LOG` filtering.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&LogConfig::default());
}

/// Initialize process-wide tracing from an explicit configuration.
pub fn init_with(config: &LogConfig) {
    tracing::init_with(config);
}
