//! # List Command

use anyhow::{Context, Result};
use githook_controller::crd::GitHook;
use kube::{api::Api, api::ListParams, Client};

/// List GitHook resources with their provider, phase and hook id
pub async fn list_command(client: Client, namespace: Option<String>) -> Result<()> {
    let api: Api<GitHook> = if let Some(ns) = &namespace {
        println!("Listing GitHook resources in namespace '{ns}'...");
        Api::namespaced(client, ns)
    } else {
        println!("Listing GitHook resources in all namespaces...");
        Api::all(client)
    };

    let hooks = api
        .list(&ListParams::default())
        .await
        .context("Failed to list GitHook resources")?;

    if hooks.items.is_empty() {
        println!("No GitHook resources found.");
        return Ok(());
    }

    println!(
        "\n{:<30} {:<20} {:<10} {:<10} {:<12} {:<8}",
        "NAME", "NAMESPACE", "PROVIDER", "PHASE", "HOOK", "READY"
    );
    println!("{}", "-".repeat(95));

    for hook in hooks.items {
        let name = hook.metadata.name.as_deref().unwrap_or("<unknown>");
        let ns = hook.metadata.namespace.as_deref().unwrap_or("<unknown>");
        let provider = hook.spec.git_provider.as_str();

        let status = hook.status.as_ref();
        let phase = status.and_then(|s| s.phase.as_deref()).unwrap_or("-");
        let hook_id = status.and_then(|s| s.id.as_deref()).unwrap_or("-");
        let ready = status
            .and_then(|s| s.conditions.iter().find(|c| c.r#type == "Ready"))
            .map_or("Unknown", |c| c.status.as_str());

        println!("{name:<30} {ns:<20} {provider:<10} {phase:<10} {hook_id:<12} {ready:<8}");
    }

    Ok(())
}
