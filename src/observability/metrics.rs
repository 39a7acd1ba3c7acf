//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `githook_reconciliations_total` - Total number of reconciliations
//! - `githook_reconciliation_errors_total` - Total number of reconciliation errors
//! - `githook_reconciliation_duration_seconds` - Duration of reconciliation operations
//! - `githook_hooks_created_total` / `githook_hooks_updated_total` - Remote hook writes
//! - `githook_provider_operations_total` - Git provider API calls by provider and operation
//! - `githook_provider_operation_duration_seconds` - Duration of git provider API calls
//! - `githook_provider_operation_errors_total` - Failed git provider API calls
//! - `githook_requeues_total` - Error-driven requeues by reason

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("githook_reconciliations_total", "Total number of reconciliations")
        .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "githook_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "githook_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static HOOKS_CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "githook_hooks_created_total",
        "Total number of remote webhooks created",
    )
    .expect("Failed to create HOOKS_CREATED_TOTAL metric - this should never happen")
});

static HOOKS_UPDATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "githook_hooks_updated_total",
        "Total number of remote webhooks updated to match their GitHook",
    )
    .expect("Failed to create HOOKS_UPDATED_TOTAL metric - this should never happen")
});

static PROVIDER_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "githook_provider_operations_total",
            "Total number of git provider API operations",
        ),
        &["provider", "operation"],
    )
    .expect("Failed to create PROVIDER_OPERATIONS_TOTAL metric - this should never happen")
});

static PROVIDER_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "githook_provider_operation_duration_seconds",
            "Duration of git provider API operations in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["provider", "operation"],
    )
    .expect("Failed to create PROVIDER_OPERATION_DURATION metric - this should never happen")
});

static PROVIDER_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "githook_provider_operation_errors_total",
            "Total number of failed git provider API operations",
        ),
        &["provider"],
    )
    .expect("Failed to create PROVIDER_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("githook_requeues_total", "Total number of error-driven requeues"),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Register all metrics with the process registry
///
/// # Errors
/// Returns an error if a metric is registered twice
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(HOOKS_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(HOOKS_UPDATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PROVIDER_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PROVIDER_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(PROVIDER_OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;

    Ok(())
}

/// Render every registered metric in the Prometheus text format
///
/// # Errors
/// Returns an error if encoding fails
pub fn gather() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_hooks_created() {
    HOOKS_CREATED_TOTAL.inc();
}

pub fn increment_hooks_updated() {
    HOOKS_UPDATED_TOTAL.inc();
}

/// Record one git provider API call
pub fn record_provider_operation(provider: &str, operation: &str, duration: f64) {
    PROVIDER_OPERATIONS_TOTAL
        .with_label_values(&[provider, operation])
        .inc();
    PROVIDER_OPERATION_DURATION
        .with_label_values(&[provider, operation])
        .observe(duration);
}

pub fn increment_provider_operation_errors(provider: &str) {
    PROVIDER_OPERATION_ERRORS_TOTAL
        .with_label_values(&[provider])
        .inc();
}

pub fn increment_requeues_total(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_operation_counter_is_labelled() {
        let before = PROVIDER_OPERATIONS_TOTAL
            .with_label_values(&["gogs", "list_hooks"])
            .get();
        record_provider_operation("gogs", "list_hooks", 0.01);
        let after = PROVIDER_OPERATIONS_TOTAL
            .with_label_values(&["gogs", "list_hooks"])
            .get();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_requeue_counter_is_labelled_by_reason() {
        let before = REQUEUES_TOTAL.with_label_values(&["KeyNotFound"]).get();
        increment_requeues_total("KeyNotFound");
        assert_eq!(REQUEUES_TOTAL.with_label_values(&["KeyNotFound"]).get(), before + 1);
    }
}
