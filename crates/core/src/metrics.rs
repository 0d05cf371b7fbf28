//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Engine bootstrap (loads, asset fetches, log traffic)
//! - File selection
//! - Conversions and deliveries

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Engine Metrics
// =============================================================================

/// Engine load attempts by result.
pub static ENGINE_LOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audex_engine_loads_total", "Total engine load attempts"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Engine load duration in seconds.
pub static ENGINE_LOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "audex_engine_load_duration_seconds",
            "Duration of engine bootstrap including asset fetches",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

/// Asset fetches by asset kind and result.
pub static ASSET_FETCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audex_asset_fetches_total", "Total engine asset fetches"),
        &["kind", "result"], // kind: "core", "binary", "worker"
    )
    .unwrap()
});

/// Engine log messages forwarded to the status reporter.
pub static ENGINE_LOG_MESSAGES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "audex_engine_log_messages_total",
        "Total engine log messages forwarded",
    )
    .unwrap()
});

// =============================================================================
// Selection Metrics
// =============================================================================

/// File selections by result.
pub static FILE_SELECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audex_file_selections_total", "Total file selections"),
        &["result"], // "accepted", "rejected"
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Conversions by result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audex_conversions_total", "Total audio extractions"),
        &["result"], // "success", "failed", "no_file", "not_ready"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "audex_conversion_duration_seconds",
            "Duration of audio extractions",
        )
        .buckets(vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
    )
    .unwrap()
});

/// Deliveries by result.
pub static DELIVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audex_deliveries_total", "Total output deliveries"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Engine
        Box::new(ENGINE_LOADS_TOTAL.clone()),
        Box::new(ENGINE_LOAD_DURATION.clone()),
        Box::new(ASSET_FETCHES_TOTAL.clone()),
        Box::new(ENGINE_LOG_MESSAGES.clone()),
        // Selection
        Box::new(FILE_SELECTIONS_TOTAL.clone()),
        // Pipeline
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(DELIVERIES_TOTAL.clone()),
    ]
}
