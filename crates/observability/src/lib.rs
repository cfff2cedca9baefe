//! Process-wide tracing setup shared by the binaries.

/// Initialize process-wide observability: the tracing subscriber and the
/// panic hook.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
    panic::install_hook();
}

/// Subscriber configuration (filters, JSON output).
pub mod tracing;

/// Panics routed through `tracing`.
pub mod panic;
