//! Shared tracing/logging setup for the service binaries.

pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize process-wide logging from `RUST_LOG` and `LOG_FORMAT`.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init();
}
