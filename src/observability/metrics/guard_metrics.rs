//! # Guard Metrics
//!
//! Counters for admission decisions, validation failures and strategy
//! kind mismatches.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec};
use std::sync::LazyLock;

// Admission decisions by resource plural and decision
static ADMISSION_DECISIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "service_catalog_admission_decisions_total",
            "Total number of admission decisions by resource and decision (allow, skip, forbidden, conflict, bad_request)",
        ),
        &["resource", "decision"],
    )
    .expect("Failed to create ADMISSION_DECISIONS_TOTAL metric - this should never happen")
});

// Rejected validations by resource kind and operation (create, update, status_update)
static VALIDATION_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "service_catalog_validation_failures_total",
            "Total number of objects rejected by validation by resource and operation",
        ),
        &["resource", "operation"],
    )
    .expect("Failed to create VALIDATION_FAILURES_TOTAL metric - this should never happen")
});

static STRATEGY_KIND_MISMATCHES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "service_catalog_strategy_kind_mismatches_total",
        "Total number of objects handed to a strategy of the wrong kind",
    )
    .expect("Failed to create STRATEGY_KIND_MISMATCHES_TOTAL metric - this should never happen")
});

/// Register guard metrics with the registry
pub(crate) fn register_guard_metrics() -> Result<()> {
    REGISTRY.register(Box::new(ADMISSION_DECISIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VALIDATION_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STRATEGY_KIND_MISMATCHES_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_admission_decisions(resource: &str, decision: &str) {
    ADMISSION_DECISIONS_TOTAL
        .with_label_values(&[resource, decision])
        .inc();
}

pub fn increment_validation_failures(resource: &str, operation: &str) {
    VALIDATION_FAILURES_TOTAL
        .with_label_values(&[resource, operation])
        .inc();
}

pub fn increment_strategy_kind_mismatches() {
    STRATEGY_KIND_MISMATCHES_TOTAL.inc();
}

/// Current admission decision count, for tests and diagnostics
pub fn admission_decisions(resource: &str, decision: &str) -> u64 {
    ADMISSION_DECISIONS_TOTAL
        .with_label_values(&[resource, decision])
        .get()
}

pub fn validation_failures(resource: &str, operation: &str) -> u64 {
    VALIDATION_FAILURES_TOTAL
        .with_label_values(&[resource, operation])
        .get()
}

pub fn strategy_kind_mismatches() -> u64 {
    STRATEGY_KIND_MISMATCHES_TOTAL.get()
}
