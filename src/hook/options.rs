//! # Hook Options
//!
//! Everything a provider call needs, assembled fresh for each reconciliation.

use crate::crd::{GitHookSpec, GitHookStatus};
use crate::error::Result;
use crate::hook::secrets::{resolve_secret, SecretStore};
use crate::hook::url::resolve_repository_url;
use tracing::debug;
use zeroize::Zeroizing;

/// Inputs for one provider interaction
///
/// Credentials are zeroised on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct HookOptions {
    /// `scheme://host[:port]` of the git host
    pub base_url: String,
    pub owner: String,
    pub project: String,
    /// Provider-specific event names, verbatim from `eventTypes`
    pub events: Vec<String>,
    pub access_token: Zeroizing<String>,
    /// Shared secret the host signs deliveries with
    pub signing_secret: Zeroizing<String>,
    /// Endpoint the git host delivers events to
    pub callback_url: String,
    /// Remote hook id recorded by an earlier reconciliation
    pub remote_hook_id: Option<String>,
}

impl HookOptions {
    /// `owner/project`
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.project)
    }
}

impl std::fmt::Debug for HookOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookOptions")
            .field("base_url", &self.base_url)
            .field("owner", &self.owner)
            .field("project", &self.project)
            .field("events", &self.events)
            .field("callback_url", &self.callback_url)
            .field("remote_hook_id", &self.remote_hook_id)
            .finish_non_exhaustive()
    }
}

/// What the controller remembers about a GitHook between attempts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedState {
    pub remote_hook_id: Option<String>,
}

impl ObservedState {
    #[must_use]
    pub fn with_hook_id(hook_id: impl Into<String>) -> Self {
        Self {
            remote_hook_id: Some(hook_id.into()),
        }
    }

    /// Read the recorded id from a GitHook status; an empty `Id` counts as absent
    #[must_use]
    pub fn from_status(status: Option<&GitHookStatus>) -> Self {
        Self {
            remote_hook_id: status
                .and_then(|status| status.id.as_deref())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }
}

/// Builds [`HookOptions`] from a spec, its observed state and the secret store
#[derive(Debug, Clone)]
pub struct OptionBuilder {
    callback_url: String,
}

impl OptionBuilder {
    #[must_use]
    pub fn new(callback_url: impl Into<String>) -> Self {
        Self {
            callback_url: callback_url.into(),
        }
    }

    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Resolve the repository URL, then the access token, then the signing secret.
    ///
    /// # Errors
    /// Returns the first resolver failure; nothing after it is attempted.
    pub async fn build(
        &self,
        store: &dyn SecretStore,
        namespace: &str,
        desired: &GitHookSpec,
        observed: &ObservedState,
    ) -> Result<HookOptions> {
        let location = resolve_repository_url(&desired.project_url)?;
        let access_token =
            resolve_secret(store, namespace, &desired.access_token.secret_key_ref).await?;
        let signing_secret =
            resolve_secret(store, namespace, &desired.secret_token.secret_key_ref).await?;

        let options = HookOptions {
            base_url: location.base_url,
            owner: location.owner,
            project: location.project,
            events: desired.event_types.clone(),
            access_token,
            signing_secret,
            callback_url: self.callback_url.clone(),
            remote_hook_id: observed.remote_hook_id.clone(),
        };
        debug!(options = ?options, "Built hook options");
        Ok(options)
    }
}
