//! # Reconcile Command

use anyhow::{Context, Result};
use githook_controller::constants::RECONCILE_ANNOTATION;
use githook_controller::crd::GitHook;
use kube::{
    api::{Api, Patch, PatchParams},
    Client,
};
use serde_json::json;

/// Trigger reconciliation by bumping the reconcile annotation
///
/// Any metadata change wakes the controller's watch, so the annotation value
/// only needs to differ from the previous one.
pub async fn reconcile_command(client: Client, name: String, namespace: Option<String>) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");
    let api: Api<GitHook> = Api::namespaced(client, ns);

    println!("🔄 Triggering reconciliation for GitHook '{ns}/{name}'...");

    api.get(&name)
        .await
        .with_context(|| format!("Failed to get GitHook '{ns}/{name}'"))?;

    let timestamp = chrono::Utc::now().to_rfc3339();
    let patch = json!({
        "metadata": {
            "annotations": {
                RECONCILE_ANNOTATION: timestamp
            }
        }
    });

    api.patch(&name, &PatchParams::default(), &Patch::Merge(patch))
        .await
        .with_context(|| format!("Failed to trigger reconciliation for GitHook '{ns}/{name}'"))?;

    println!("✅ Reconciliation triggered successfully");
    println!("   Resource: {ns}/{name}");
    println!("   Annotation: {RECONCILE_ANNOTATION}={timestamp}");

    Ok(())
}
