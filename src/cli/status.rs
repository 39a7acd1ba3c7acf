//! # Status Command

use anyhow::{Context, Result};
use githook_controller::crd::GitHook;
use kube::{api::Api, Client};

/// Show detailed status of a GitHook resource
pub async fn status_command(client: Client, name: String, namespace: Option<String>) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");

    println!("📊 Status for GitHook '{ns}/{name}'");
    println!();

    let api: Api<GitHook> = Api::namespaced(client, ns);
    let hook = api
        .get(&name)
        .await
        .with_context(|| format!("Failed to get GitHook '{ns}/{name}'"))?;

    println!("Resource Information:");
    println!(
        "  Name: {}",
        hook.metadata.name.as_deref().unwrap_or("<unknown>")
    );
    println!(
        "  Namespace: {}",
        hook.metadata.namespace.as_deref().unwrap_or("<unknown>")
    );
    if let Some(generation) = hook.metadata.generation {
        println!("  Generation: {generation}");
    }

    println!();
    println!("Spec:");
    println!("  Project URL: {}", hook.spec.project_url);
    println!("  Provider: {}", hook.spec.git_provider);
    if hook.spec.event_types.is_empty() {
        println!("  Events: push (default)");
    } else {
        println!("  Events: {}", hook.spec.event_types.join(", "));
    }
    println!(
        "  Access Token: secret {}/{} key {}",
        ns, hook.spec.access_token.secret_key_ref.name, hook.spec.access_token.secret_key_ref.key
    );
    println!(
        "  Signing Secret: secret {}/{} key {}",
        ns, hook.spec.secret_token.secret_key_ref.name, hook.spec.secret_token.secret_key_ref.key
    );

    println!();
    println!("Status:");
    let Some(status) = &hook.status else {
        println!("  Not reconciled yet");
        return Ok(());
    };

    println!("  Phase: {}", status.phase.as_deref().unwrap_or("-"));
    println!("  Hook ID: {}", status.id.as_deref().unwrap_or("-"));
    if let Some(description) = &status.description {
        println!("  Description: {description}");
    }
    if let Some(observed) = status.observed_generation {
        println!("  Observed Generation: {observed}");
    }
    if let Some(last) = &status.last_reconcile_time {
        println!("  Last Reconcile: {last}");
    }

    if !status.conditions.is_empty() {
        println!();
        println!("Conditions:");
        for condition in &status.conditions {
            println!("  - {}: {}", condition.r#type, condition.status);
            if let Some(reason) = &condition.reason {
                println!("    Reason: {reason}");
            }
            if let Some(message) = &condition.message {
                println!("    Message: {message}");
            }
            if let Some(since) = &condition.last_transition_time {
                println!("    Since: {since}");
            }
        }
    }

    Ok(())
}
