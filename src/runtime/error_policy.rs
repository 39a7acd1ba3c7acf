//! # Error Policy
//!
//! Requeue scheduling for failed reconciliations.

use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::crd::GitHook;
use crate::observability::metrics;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Compute the retry delay for a failed resource.
///
/// Transient failures, which include every git host error, walk the
/// resource's Fibonacci sequence. Permanent ones (bad URL, missing secret,
/// unsupported provider or event type) wait the maximum delay straight away.
/// Backoff state is kept per resource.
pub fn handle_reconciliation_error(
    hook: Arc<GitHook>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = hook.name_any();
    let namespace = hook.namespace().unwrap_or_else(|| "default".to_string());

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = %name,
        resource.namespace = %namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}/{}: {}", namespace, name, error);
    metrics::increment_reconciliation_errors();

    let (delay, error_count) = next_delay(&ctx, &format!("{namespace}/{name}"), error);

    let next_trigger_time = chrono::Utc::now()
        + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
    info!(
        "Retrying in {}s (error count: {}, transient: {}), next attempt at {}",
        delay.as_secs(),
        error_count,
        error.is_transient(),
        next_trigger_time.to_rfc3339()
    );

    metrics::increment_requeues_total(error.reason());
    Action::requeue(delay)
}

fn next_delay(ctx: &Reconciler, resource_key: &str, error: &ReconcilerError) -> (Duration, u32) {
    let min = ctx.config.backoff_min_minutes;
    let max = ctx.config.backoff_max_minutes;

    match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states
                .entry(resource_key.to_string())
                .or_insert_with(|| BackoffState::new(min, max));
            state.increment_error();
            let delay = if error.is_transient() {
                state.backoff.next_backoff()
            } else {
                state.backoff.max_backoff()
            };
            (delay, state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff_states: {}, using default backoff", e);
            (Duration::from_secs(min.saturating_mul(60)), 0)
        }
    }
}
