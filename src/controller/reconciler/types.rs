//! # Reconciler Types
//!
//! Shared context and error type handed to the kube-rs controller.

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::error::GitHookError;
use crate::hook::{Engine, KubeSecretStore, OptionBuilder};
use crate::provider::HttpClientFactory;
use anyhow::Result;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

/// Per-resource retry state, keyed by `namespace/name`
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_minutes, max_minutes),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }
}

/// Context shared by every reconciliation
pub struct Reconciler {
    pub client: Client,
    pub engine: Engine,
    pub config: ControllerConfig,
    pub backoff_states: Mutex<HashMap<String, BackoffState>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Wire the production engine: Kubernetes secrets and REST provider clients
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(client: Client, config: ControllerConfig) -> Result<Self> {
        let engine = Engine::new(
            OptionBuilder::new(config.callback_url.clone()),
            Arc::new(KubeSecretStore::new(client.clone())),
            Arc::new(HttpClientFactory::new(config.http_timeout())?),
        );
        Ok(Self::with_engine(client, engine, config))
    }

    #[must_use]
    pub fn with_engine(client: Client, engine: Engine, config: ControllerConfig) -> Self {
        Self {
            client,
            engine,
            config,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Forget the error history of a resource after a successful attempt
    pub fn reset_backoff(&self, resource_key: &str) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                states.remove(resource_key);
            }
            Err(e) => warn!("Failed to lock backoff_states: {}", e),
        }
    }
}

/// Error returned to the kube-rs controller
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error(transparent)]
    GitHook(#[from] GitHookError),

    #[error("failed to update GitHook status: {0}")]
    Status(#[source] kube::Error),
}

impl ReconcilerError {
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::GitHook(e) => e.is_transient(),
            Self::Status(_) => true,
        }
    }

    /// Label for the requeue metric
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::GitHook(e) => e.reason(),
            Self::Status(_) => "StatusUpdateFailed",
        }
    }
}
