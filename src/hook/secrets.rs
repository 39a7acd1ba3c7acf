//! # Secret Resolution
//!
//! Access tokens and signing secrets are read from Kubernetes Secrets in the
//! GitHook's namespace on every attempt. Nothing is cached, so a rotated
//! token takes effect on the next reconciliation.

use crate::crd::SecretKeySelector;
use crate::error::{GitHookError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::debug;
use zeroize::Zeroizing;

/// Read access to Secret data
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the decoded data of a Secret, or `None` if it does not exist
    async fn get(&self, namespace: &str, name: &str)
        -> Result<Option<BTreeMap<String, Vec<u8>>>>;
}

/// [`SecretStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api
            .get_opt(name)
            .await
            .map_err(|e| GitHookError::SecretStore {
                name: format!("{namespace}/{name}"),
                message: e.to_string(),
            })?;

        Ok(secret.map(|secret| {
            secret
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|(key, value)| (key, value.0))
                .collect()
        }))
    }
}

/// Resolve one secret reference to its string value.
///
/// Trailing CR/LF is trimmed; secrets created from files usually end in a
/// newline that no git host expects.
///
/// # Errors
/// - `SecretNotFound` if the Secret does not exist
/// - `KeyNotFound` if the Secret lacks the key
/// - `SecretStore` if the store fails or the value is not UTF-8
pub async fn resolve_secret(
    store: &dyn SecretStore,
    namespace: &str,
    selector: &SecretKeySelector,
) -> Result<Zeroizing<String>> {
    let data = store
        .get(namespace, &selector.name)
        .await?
        .ok_or_else(|| GitHookError::SecretNotFound {
            namespace: namespace.to_string(),
            name: selector.name.clone(),
        })?;

    let bytes = data.get(&selector.key).ok_or_else(|| GitHookError::KeyNotFound {
        key: selector.key.clone(),
        secret: selector.name.clone(),
    })?;

    let value = std::str::from_utf8(bytes).map_err(|e| GitHookError::SecretStore {
        name: selector.name.clone(),
        message: format!("value of key \"{}\" is not valid UTF-8: {e}", selector.key),
    })?;

    debug!(
        secret.name = %selector.name,
        secret.key = %selector.key,
        "Resolved secret reference"
    );
    Ok(Zeroizing::new(value.trim_end_matches(['\r', '\n']).to_string()))
}
