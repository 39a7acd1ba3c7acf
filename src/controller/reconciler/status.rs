//! # Status Updates
//!
//! Builds and patches `GitHook` status. Patches are skipped when nothing a
//! user would notice has changed, since every status write triggers another
//! watch event.

use crate::constants::FIELD_MANAGER;
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::crd::{Condition, GitHook, GitHookStatus};
use crate::error::GitHookError;
use crate::hook::{ObservedState, ReconcileOutcome};
use kube::api::{Patch, PatchParams};
use kube::{Api, ResourceExt};
use tracing::debug;

pub const PHASE_READY: &str = "Ready";
pub const PHASE_FAILED: &str = "Failed";

const CONDITION_READY: &str = "Ready";

/// Status after a successful attempt
#[must_use]
pub fn ready_status(
    hook: &GitHook,
    observed: &ObservedState,
    outcome: &ReconcileOutcome,
) -> GitHookStatus {
    let description = match observed.remote_hook_id.as_deref() {
        Some(id) => format!("Webhook {id} is in sync"),
        None => "Webhook is in sync".to_string(),
    };
    let reason = match outcome {
        ReconcileOutcome::Created(_) => "HookCreated",
        ReconcileOutcome::Updated(_) => "HookUpdated",
        ReconcileOutcome::Unchanged => "HookInSync",
    };

    build_status(
        hook,
        observed.remote_hook_id.clone(),
        PHASE_READY,
        description,
        ready_condition(hook, "True", reason, None),
    )
}

/// Status after a failed attempt; the recorded hook id is carried over
#[must_use]
pub fn failed_status(hook: &GitHook, error: &GitHookError) -> GitHookStatus {
    let message = error.to_string();
    build_status(
        hook,
        hook.status.as_ref().and_then(|s| s.id.clone()),
        PHASE_FAILED,
        message.clone(),
        ready_condition(hook, "False", error.reason(), Some(message)),
    )
}

fn build_status(
    hook: &GitHook,
    id: Option<String>,
    phase: &str,
    description: String,
    ready: Condition,
) -> GitHookStatus {
    GitHookStatus {
        id,
        phase: Some(phase.to_string()),
        description: Some(description),
        conditions: vec![ready],
        observed_generation: hook.metadata.generation,
        last_reconcile_time: Some(chrono::Utc::now().to_rfc3339()),
    }
}

/// `lastTransitionTime` only moves when the condition status flips
fn ready_condition(
    hook: &GitHook,
    status: &str,
    reason: &str,
    message: Option<String>,
) -> Condition {
    let previous = hook
        .status
        .as_ref()
        .and_then(|s| s.conditions.iter().find(|c| c.r#type == CONDITION_READY));
    let last_transition_time = match previous {
        Some(condition) if condition.status == status => condition.last_transition_time.clone(),
        _ => Some(chrono::Utc::now().to_rfc3339()),
    };

    Condition {
        r#type: CONDITION_READY.to_string(),
        status: status.to_string(),
        last_transition_time,
        reason: Some(reason.to_string()),
        message,
    }
}

/// Whether `next` differs from `current` in anything but timestamps.
///
/// A repeated failure with the same Ready reason keeps its first
/// description; provider messages may differ on every attempt.
#[must_use]
pub fn needs_update(current: Option<&GitHookStatus>, next: &GitHookStatus) -> bool {
    let Some(current) = current else {
        return true;
    };
    let ready = |status: &GitHookStatus| {
        status
            .conditions
            .iter()
            .find(|c| c.r#type == CONDITION_READY)
            .map(|c| (c.status.clone(), c.reason.clone()))
    };
    let (current_ready, next_ready) = (ready(current), ready(next));
    let same_failure = current.phase.as_deref() == Some(PHASE_FAILED)
        && next.phase.as_deref() == Some(PHASE_FAILED)
        && current_ready == next_ready;

    current.id != next.id
        || current.phase != next.phase
        || (current.description != next.description && !same_failure)
        || current.observed_generation != next.observed_generation
        || current_ready.map(|(status, _)| status) != next_ready.map(|(status, _)| status)
}

/// Merge-patch `next` into the resource's status subresource
///
/// # Errors
/// Returns `ReconcilerError::Status` if the API server rejects the patch
pub async fn apply(
    reconciler: &Reconciler,
    hook: &GitHook,
    next: GitHookStatus,
) -> Result<(), ReconcilerError> {
    if !needs_update(hook.status.as_ref(), &next) {
        debug!(
            phase = next.phase.as_deref().unwrap_or(""),
            "Skipping status update - nothing changed"
        );
        return Ok(());
    }

    let namespace = hook.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<GitHook> = Api::namespaced(reconciler.client.clone(), &namespace);
    let patch = serde_json::json!({ "status": next });

    api.patch_status(
        &hook.name_any(),
        &PatchParams::apply(FIELD_MANAGER),
        &Patch::Merge(patch),
    )
    .await
    .map_err(ReconcilerError::Status)?;

    Ok(())
}
