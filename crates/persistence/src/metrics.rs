//! Storage metrics collection.
//!
//! Provides functions for recording key-value store metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the duration of a storage operation.
pub fn record_store_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "storage_operation_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Record a failed storage operation.
pub fn record_store_error(operation: &str) {
    counter!(
        "storage_operation_errors_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Times a storage operation and records it on completion.
///
/// Usage:
/// ```ignore
/// let timer = StoreTimer::new("file_store_save");
/// let result = std::fs::write(&path, value);
/// timer.finish(result.is_ok());
/// ```
pub struct StoreTimer {
    operation: &'static str,
    start: Instant,
}

impl StoreTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration, and an error count when `ok` is false.
    pub fn finish(self, ok: bool) {
        record_store_duration(self.operation, self.start.elapsed().as_secs_f64());
        if !ok {
            record_store_error(self.operation);
        }
    }
}
