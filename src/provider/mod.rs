//! # Provider Modules
//!
//! Webhook management for each supported git host.
//!
//! Every host implements [`HookClient`]. The reconciliation engine never
//! names a concrete client; it asks a [`ClientFactory`] for one by
//! [`GitProvider`] so tests can substitute fakes.

use crate::error::{GitHookError, Result};
use crate::hook::HookOptions;
use anyhow::Context;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// Common utilities shared across providers
pub mod common;

// Provider implementations
pub mod github;
pub mod gitlab;
pub mod gogs;

pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use gogs::GogsClient;

/// Supported git hosting providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitProvider {
    GitHub,
    GitLab,
    Gogs,
}

impl GitProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Gogs => "gogs",
        }
    }
}

impl fmt::Display for GitProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GitProvider {
    type Err = GitHookError;

    /// Matching is case-insensitive and ignores surrounding whitespace.
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            "gogs" => Ok(Self::Gogs),
            _ => Err(GitHookError::UnsupportedProvider(value.to_string())),
        }
    }
}

/// Remote hook state as seen by [`HookClient::validate`]
///
/// `changed` is only meaningful when `exists` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookState {
    pub exists: bool,
    pub changed: bool,
    /// Identifier of the matched hook, when the client had to search for it
    pub hook_id: Option<String>,
}

impl HookState {
    /// No hook with the desired callback URL (or the recorded id) exists
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn found(hook_id: impl Into<String>, changed: bool) -> Self {
        Self {
            exists: true,
            changed,
            hook_id: Some(hook_id.into()),
        }
    }
}

/// Capability set every git host client exposes
#[async_trait]
pub trait HookClient: Send + Sync {
    fn provider(&self) -> GitProvider;

    /// Report whether the remote hook exists and differs from `options`.
    ///
    /// With `remote_hook_id` set, the hook is looked up by id and a missing
    /// hook is a `ProviderApi` error with status 404. Without it, the hooks
    /// of the repository are searched for the callback URL.
    async fn validate(&self, options: &HookOptions) -> Result<HookState>;

    /// Create a hook and return its remote identifier
    async fn create(&self, options: &HookOptions) -> Result<String>;

    /// Overwrite the hook named by `remote_hook_id` and return its identifier
    async fn update(&self, options: &HookOptions) -> Result<String>;
}

/// Selects the [`HookClient`] for a provider
pub trait ClientFactory: Send + Sync {
    /// # Errors
    /// Returns an error if the client cannot be constructed from `options`
    fn client_for(&self, provider: GitProvider, options: &HookOptions)
        -> Result<Box<dyn HookClient>>;
}

/// Builds REST clients that share one connection pool
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    http: reqwest::Client,
}

impl HttpClientFactory {
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(crate::constants::USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { http })
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl ClientFactory for HttpClientFactory {
    fn client_for(
        &self,
        provider: GitProvider,
        options: &HookOptions,
    ) -> Result<Box<dyn HookClient>> {
        Ok(match provider {
            GitProvider::GitHub => Box::new(GitHubClient::new(self.http.clone(), options)?),
            GitProvider::GitLab => Box::new(GitLabClient::new(self.http.clone(), options)?),
            GitProvider::Gogs => Box::new(GogsClient::new(self.http.clone(), options)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing_is_case_insensitive() {
        assert_eq!("github".parse::<GitProvider>().unwrap(), GitProvider::GitHub);
        assert_eq!("GitLab".parse::<GitProvider>().unwrap(), GitProvider::GitLab);
        assert_eq!(" GOGS ".parse::<GitProvider>().unwrap(), GitProvider::Gogs);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = "bitbucket".parse::<GitProvider>().unwrap_err();
        assert!(matches!(err, GitHookError::UnsupportedProvider(ref p) if p == "bitbucket"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for provider in [GitProvider::GitHub, GitProvider::GitLab, GitProvider::Gogs] {
            assert_eq!(provider.to_string().parse::<GitProvider>().unwrap(), provider);
        }
    }
}
