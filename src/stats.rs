//! Processor statistics
//!
//! Counters describing what a converter did across all `apply` calls.
//! `apply` takes `&self`, so counters are atomics.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counter using atomic operations
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        Self {
            value: AtomicU64::new(self.get()),
        }
    }
}

/// Per-converter counters
#[derive(Debug, Default, Clone)]
pub struct ProcessorStats {
    /// Metrics passed through `apply`
    pub metrics_processed: Counter,
    /// Fields whose name matched the pattern
    pub fields_matched: Counter,
    /// Fields successfully converted and renamed
    pub fields_converted: Counter,
    /// Fields skipped because the value was not numeric
    pub coercion_failures: Counter,
    /// Fields skipped because the unit pair has no conversion
    pub conversion_failures: Counter,
}

impl ProcessorStats {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            metrics_processed: self.metrics_processed.get(),
            fields_matched: self.fields_matched.get(),
            fields_converted: self.fields_converted.get(),
            coercion_failures: self.coercion_failures.get(),
            conversion_failures: self.conversion_failures.get(),
        }
    }
}

/// Plain copy of `ProcessorStats`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub metrics_processed: u64,
    pub fields_matched: u64,
    pub fields_converted: u64,
    pub coercion_failures: u64,
    pub conversion_failures: u64,
}

impl std::ops::Add for StatsSnapshot {
    type Output = StatsSnapshot;

    fn add(self, rhs: StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            metrics_processed: self.metrics_processed + rhs.metrics_processed,
            fields_matched: self.fields_matched + rhs.fields_matched,
            fields_converted: self.fields_converted + rhs.fields_converted,
            coercion_failures: self.coercion_failures + rhs.coercion_failures,
            conversion_failures: self.conversion_failures + rhs.conversion_failures,
        }
    }
}

impl StatsSnapshot {
    /// Total per-field failures
    pub fn failures(&self) -> u64 {
        self.coercion_failures + self.conversion_failures
    }
}
