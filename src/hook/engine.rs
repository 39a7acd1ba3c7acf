//! # Reconciliation Engine
//!
//! One attempt to make the remote hook match a GitHook:
//!
//! ```text
//! build options -> select client -> validate
//!     missing            -> create -> record id
//!     exists, changed    -> update -> record id
//!     exists, unchanged  -> nothing
//! ```
//!
//! The engine keeps no state between attempts and never retries. Any error
//! ends the attempt and is returned as-is; the caller decides on requeueing.

use crate::crd::GitHookSpec;
use crate::error::{GitHookError, Result};
use crate::hook::options::{ObservedState, OptionBuilder};
use crate::hook::secrets::SecretStore;
use crate::provider::ClientFactory;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a successful attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Remote hook already matched; no write was issued
    Unchanged,
    /// A new hook was registered under this id
    Created(String),
    /// The hook with this id was overwritten
    Updated(String),
}

impl ReconcileOutcome {
    #[must_use]
    pub fn hook_id(&self) -> Option<&str> {
        match self {
            Self::Unchanged => None,
            Self::Created(id) | Self::Updated(id) => Some(id),
        }
    }

    /// Observed state to persist; `Unchanged` keeps `previous` as it was
    #[must_use]
    pub fn observed(&self, previous: &ObservedState) -> ObservedState {
        match self.hook_id() {
            Some(id) => ObservedState::with_hook_id(id),
            None => previous.clone(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
        }
    }
}

/// Drives option building, client selection and the create/update decision
#[derive(Clone)]
pub struct Engine {
    options: OptionBuilder,
    secrets: Arc<dyn SecretStore>,
    clients: Arc<dyn ClientFactory>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("callback_url", &self.options.callback_url())
            .finish_non_exhaustive()
    }
}

impl Engine {
    #[must_use]
    pub fn new(
        options: OptionBuilder,
        secrets: Arc<dyn SecretStore>,
        clients: Arc<dyn ClientFactory>,
    ) -> Self {
        Self {
            options,
            secrets,
            clients,
        }
    }

    /// Run one reconciliation attempt for a GitHook in `namespace`.
    ///
    /// # Errors
    /// Returns the first failure from option building, provider selection or
    /// any remote call. No remote call is made if option building fails.
    pub async fn reconcile(
        &self,
        namespace: &str,
        desired: &GitHookSpec,
        observed: &ObservedState,
    ) -> Result<ReconcileOutcome> {
        let mut options = self
            .options
            .build(self.secrets.as_ref(), namespace, desired, observed)
            .await?;
        let client = self
            .clients
            .client_for(desired.git_provider.parse()?, &options)?;
        let provider = client.provider();

        let state = client.validate(&options).await?;

        if !state.exists {
            info!(provider = %provider, "Creating webhook on {}", options.repository());
            let hook_id = client.create(&options).await?;
            if hook_id.is_empty() {
                return Err(GitHookError::provider_api(
                    provider,
                    None,
                    "create succeeded without returning a hook id",
                ));
            }
            return Ok(ReconcileOutcome::Created(hook_id));
        }

        if state.changed {
            if options.remote_hook_id.is_none() {
                // Hook matched by callback URL; adopt it instead of creating a duplicate.
                options.remote_hook_id.clone_from(&state.hook_id);
            }
            info!(
                provider = %provider,
                hook.id = options.remote_hook_id.as_deref().unwrap_or(""),
                "Updating webhook on {}",
                options.repository()
            );
            let hook_id = client.update(&options).await?;
            return Ok(ReconcileOutcome::Updated(hook_id));
        }

        debug!(provider = %provider, "Webhook on {} is up to date", options.repository());
        Ok(ReconcileOutcome::Unchanged)
    }
}
