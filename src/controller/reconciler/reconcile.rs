//! # Reconcile
//!
//! Entry point invoked by the kube-rs controller for each `GitHook` event.

use crate::controller::reconciler::status;
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::crd::GitHook;
use crate::hook::{ObservedState, ReconcileOutcome};
use crate::observability::metrics;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Reconcile one `GitHook`.
///
/// Deleted resources are skipped without touching the remote. On success the
/// hook id and a `Ready` condition are written to status; on failure the
/// status is marked `Failed` with `Id` left as it was, and the error is
/// returned so the error policy can schedule a retry.
pub async fn reconcile(hook: Arc<GitHook>, ctx: Arc<Reconciler>) -> Result<Action, ReconcilerError> {
    let name = hook.name_any();
    let namespace = hook.namespace().unwrap_or_else(|| "default".to_string());

    if hook.metadata.deletion_timestamp.is_some() {
        info!("GitHook {}/{} is being deleted, skipping", namespace, name);
        ctx.reset_backoff(&format!("{namespace}/{name}"));
        return Ok(Action::await_change());
    }

    let span = info_span!(
        "reconcile",
        resource.name = %name,
        resource.namespace = %namespace,
        resource.provider = %hook.spec.git_provider,
        generation = hook.metadata.generation.unwrap_or(0)
    );

    async move {
        let start = Instant::now();
        metrics::increment_reconciliations();

        let observed = ObservedState::from_status(hook.status.as_ref());
        let result = ctx
            .engine
            .reconcile(&namespace, &hook.spec, &observed)
            .await;
        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        match result {
            Ok(outcome) => {
                match &outcome {
                    ReconcileOutcome::Created(_) => metrics::increment_hooks_created(),
                    ReconcileOutcome::Updated(_) => metrics::increment_hooks_updated(),
                    ReconcileOutcome::Unchanged => {}
                }
                let next = outcome.observed(&observed);
                info!(
                    outcome = outcome.as_str(),
                    hook.id = next.remote_hook_id.as_deref().unwrap_or(""),
                    "Reconciliation succeeded"
                );

                status::apply(&ctx, &hook, status::ready_status(&hook, &next, &outcome)).await?;
                ctx.reset_backoff(&format!("{namespace}/{name}"));

                Ok(ctx
                    .config
                    .resync_interval()
                    .map_or_else(Action::await_change, Action::requeue))
            }
            Err(e) => {
                warn!(reason = e.reason(), "Reconciliation failed: {}", e);
                if let Err(status_err) =
                    status::apply(&ctx, &hook, status::failed_status(&hook, &e)).await
                {
                    warn!("Could not record failure in status: {}", status_err);
                }
                Err(e.into())
            }
        }
    }
    .instrument(span)
    .await
}
