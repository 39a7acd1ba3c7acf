//! # Initialization
//!
//! Process start-up: TLS provider, logging, metrics, probe server,
//! Kubernetes client and the shared reconciler context.

use crate::config::{ControllerConfig, ServerConfig};
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::crd::GitHook;
use crate::observability::metrics;
use anyhow::{Context, Result};
use kube::api::{Api, ListParams};
use kube::Client;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Everything the watch loop needs
pub struct InitializationResult {
    pub client: Client,
    pub hooks: Api<GitHook>,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.is_ready())
            .finish_non_exhaustive()
    }
}

/// Install ring as the process-wide rustls provider.
///
/// Both kube and reqwest use rustls and must agree on one provider. Returns
/// `false` when a provider was already in place. Runs before logging is set
/// up, so the caller reports the result.
fn install_crypto_provider() -> bool {
    rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok()
}

/// Bring the controller up to the point where it can start watching
///
/// # Errors
/// Returns an error if the metrics server does not start, the Kubernetes
/// client cannot be created, or the HTTP client cannot be built.
pub async fn initialize() -> Result<InitializationResult> {
    let provider_installed = install_crypto_provider();

    let controller_config = ControllerConfig::from_env();
    let server_config = ServerConfig::from_env();

    init_tracing(&controller_config.log_format);

    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting GitHook Controller");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(
        callback_url = %controller_config.callback_url,
        http_timeout_secs = controller_config.http_timeout_secs,
        watch_namespace = controller_config.watch_namespace.as_deref().unwrap_or("<all>"),
        "Loaded controller configuration"
    );

    metrics::register_metrics().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = Arc::clone(&server_state);
    let server_port = server_config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle, &server_config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let hooks: Api<GitHook> = match controller_config.watch_namespace.as_deref() {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    };
    log_existing_resources(&hooks).await;

    let reconciler = Arc::new(
        Reconciler::new(client.clone(), controller_config)
            .context("Failed to create reconciler")?,
    );

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        hooks,
        reconciler,
        server_state,
    })
}

/// `RUST_LOG` filter (default `githook_controller=info`) with JSON or text output
fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("githook_controller=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if log_format == "text" {
        builder.try_init()
    } else {
        builder.json().try_init()
    };
    if let Err(e) = result {
        warn!("Tracing subscriber already initialized: {}", e);
    }
}

async fn wait_for_server_ready(
    server_state: &ServerState,
    server_handle: &tokio::task::JoinHandle<()>,
    server_config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = server_config.startup_timeout();
    let start_time = std::time::Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }
        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }
        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }
        tokio::time::sleep(server_config.poll_interval()).await;
    }
}

/// Confirm the CRD is installed and summarise what will be reconciled
async fn log_existing_resources(hooks: &Api<GitHook>) {
    match hooks.list(&ListParams::default()).await {
        Ok(list) => {
            info!(
                "CRD is queryable, found {} existing GitHook resources",
                list.items.len()
            );
            for hook in &list.items {
                info!(
                    "  - {}/{} ({})",
                    hook.metadata.namespace.as_deref().unwrap_or("default"),
                    hook.metadata.name.as_deref().unwrap_or("unknown"),
                    hook.spec.git_provider
                );
            }
        }
        Err(e) => {
            warn!(
                "Could not list GitHook resources ({}); is the CRD installed? Run `crdgen | kubectl apply -f -`",
                e
            );
        }
    }
}
