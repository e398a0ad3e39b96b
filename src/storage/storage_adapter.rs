//! Storage adapters.
//!
//! An adapter wraps a store and has the same interface as a store.
//! Includes a [performance metrics](performance_metrics::PerformanceMetricsStorageAdapter) adapter which counts requests and bytes,
//! and a [usage log](usage_log::UsageLogStorageAdapter) adapter which logs every request.

pub mod performance_metrics;
pub mod usage_log;
