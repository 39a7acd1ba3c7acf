//! Common test utilities for the provider and engine integration tests
//!
//! Provides rustls setup, an in-memory secret store and builders for hook
//! options pointing at a wiremock server.
#![allow(dead_code, reason = "each test binary uses a subset of these helpers")]

use async_trait::async_trait;
use githook_controller::crd::{GitHookSpec, SecretKeySelector};
use githook_controller::error::Result;
use githook_controller::hook::{HookOptions, SecretStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use zeroize::Zeroizing;

pub const ACCESS_TOKEN: &str = "token-123";
pub const SIGNING_SECRET: &str = "s3cret";
pub const CALLBACK_URL: &str = "https://ci.example.com/hook";

static RUSTLS_INIT: Once = Once::new();

/// Install the ring crypto provider once per test binary
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Hook options for `acme/widgets` hosted at `base_url`
pub fn options(base_url: &str, events: &[&str], hook_id: Option<&str>) -> HookOptions {
    HookOptions {
        base_url: base_url.trim_end_matches('/').to_string(),
        owner: "acme".to_string(),
        project: "widgets".to_string(),
        events: events.iter().map(|e| (*e).to_string()).collect(),
        access_token: Zeroizing::new(ACCESS_TOKEN.to_string()),
        signing_secret: Zeroizing::new(SIGNING_SECRET.to_string()),
        callback_url: CALLBACK_URL.to_string(),
        remote_hook_id: hook_id.map(str::to_string),
    }
}

/// GitHook spec for `{base_url}/acme/widgets` reading credentials from `git-creds`
pub fn spec(base_url: &str, provider: &str, events: &[&str]) -> GitHookSpec {
    GitHookSpec {
        project_url: format!("{}/acme/widgets", base_url.trim_end_matches('/')),
        git_provider: provider.to_string(),
        access_token: SecretKeySelector::new("git-creds", "token").into(),
        secret_token: SecretKeySelector::new("git-creds", "webhook-secret").into(),
        event_types: events.iter().map(|e| (*e).to_string()).collect(),
    }
}

/// In-memory [`SecretStore`] keyed by `namespace/name`
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    lookups: AtomicUsize,
}

impl MemorySecretStore {
    /// Store holding `ci/git-creds` with both keys used by [`spec`]
    pub fn with_credentials() -> Self {
        Self::default().insert(
            "ci",
            "git-creds",
            &[("token", ACCESS_TOKEN), ("webhook-secret", SIGNING_SECRET)],
        )
    }

    pub fn insert(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        self.secrets.insert(
            format!("{namespace}/{name}"),
            data.iter()
                .map(|(k, v)| ((*k).to_string(), v.as_bytes().to_vec()))
                .collect(),
        );
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.secrets.get(&format!("{namespace}/{name}")).cloned())
    }
}
