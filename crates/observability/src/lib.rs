//! Process-wide tracing setup.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with an explicit default filter, used when `RUST_LOG` is unset.
pub fn init_with_default(directive: &str) {
    tracing::init_with_default(directive);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
