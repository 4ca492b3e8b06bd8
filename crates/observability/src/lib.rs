//! Tracing/logging setup shared by every binary in the workspace.

/// Initialize process-wide logging with the format taken from `LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, formatters).
pub mod tracing;
