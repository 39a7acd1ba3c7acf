//! # Errors
//!
//! Failure taxonomy shared by the URL resolver, secret resolver, option
//! builder, provider clients and reconciliation engine.

use crate::provider::GitProvider;
use thiserror::Error;

/// Result alias used across the hook and provider modules
pub type Result<T, E = GitHookError> = std::result::Result<T, E>;

/// Errors produced while reconciling a single GitHook
#[derive(Debug, Error)]
pub enum GitHookError {
    /// `projectUrl` could not be split into base URL, owner and project
    #[error("malformed project URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// Referenced Secret does not exist
    #[error("secret \"{name}\" not found in namespace \"{namespace}\"")]
    SecretNotFound { namespace: String, name: String },

    /// Secret exists but lacks the referenced key
    #[error("key \"{key}\" not found in secret \"{secret}\"")]
    KeyNotFound { key: String, secret: String },

    /// Secret store could not be read, or held an unusable value
    #[error("failed to read secret \"{name}\": {message}")]
    SecretStore { name: String, message: String },

    /// `gitProvider` names a host this controller does not support
    #[error("git provider {0} not supported")]
    UnsupportedProvider(String),

    /// An event type has no equivalent on the selected git host
    #[error("unsupported {provider} event type '{event}'")]
    UnsupportedEvent { provider: GitProvider, event: String },

    /// The git host rejected a call or was unreachable
    #[error("{provider} API error{}: {message}", status_suffix(*.status))]
    ProviderApi {
        provider: GitProvider,
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}

impl GitHookError {
    pub(crate) fn malformed_url(url: &str, reason: impl Into<String>) -> Self {
        Self::MalformedUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn provider_api(
        provider: GitProvider,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderApi {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Whether the failure is worth retrying on the regular backoff schedule.
    ///
    /// Anything the git host or the secret store reported is retried, whatever
    /// the HTTP status: credentials get rotated and repositories get created
    /// without the GitHook changing. Errors in the GitHook itself wait for a
    /// spec change.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::SecretStore { .. } | Self::ProviderApi { .. } => true,
            Self::MalformedUrl { .. }
            | Self::SecretNotFound { .. }
            | Self::KeyNotFound { .. }
            | Self::UnsupportedProvider(_)
            | Self::UnsupportedEvent { .. } => false,
        }
    }

    /// Short CamelCase reason used for status conditions and metric labels
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MalformedUrl { .. } => "MalformedUrl",
            Self::SecretNotFound { .. } => "SecretNotFound",
            Self::KeyNotFound { .. } => "KeyNotFound",
            Self::SecretStore { .. } => "SecretStoreError",
            Self::UnsupportedProvider(_) => "UnsupportedProvider",
            Self::UnsupportedEvent { .. } => "UnsupportedEvent",
            Self::ProviderApi { .. } => "ProviderApiError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_message() {
        let err = GitHookError::KeyNotFound {
            key: "token".to_string(),
            secret: "creds".to_string(),
        };
        assert_eq!(err.to_string(), "key \"token\" not found in secret \"creds\"");
    }

    #[test]
    fn test_unsupported_provider_message() {
        let err = GitHookError::UnsupportedProvider("bitbucket".to_string());
        assert_eq!(err.to_string(), "git provider bitbucket not supported");
    }

    #[test]
    fn test_provider_api_message_includes_status() {
        let err = GitHookError::provider_api(GitProvider::GitLab, Some(404), "hook 9 not found");
        assert_eq!(err.to_string(), "gitlab API error (HTTP 404): hook 9 not found");

        let err = GitHookError::provider_api(GitProvider::Gogs, None, "connection refused");
        assert_eq!(err.to_string(), "gogs API error: connection refused");
    }

    #[test]
    fn test_unsupported_event_message_has_no_status() {
        let err = GitHookError::UnsupportedEvent {
            provider: GitProvider::GitLab,
            event: "build".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported gitlab event type 'build'");
        assert_eq!(err.reason(), "UnsupportedEvent");
    }

    #[test]
    fn test_transient_classification() {
        assert!(GitHookError::provider_api(GitProvider::GitHub, None, "timeout").is_transient());
        assert!(GitHookError::provider_api(GitProvider::GitHub, Some(503), "down").is_transient());
        assert!(GitHookError::provider_api(GitProvider::GitHub, Some(429), "slow down").is_transient());
        assert!(GitHookError::provider_api(GitProvider::GitHub, Some(401), "bad token").is_transient());
        assert!(GitHookError::provider_api(GitProvider::GitHub, Some(404), "gone").is_transient());
        assert!(!GitHookError::UnsupportedEvent {
            provider: GitProvider::GitLab,
            event: "build".to_string(),
        }
        .is_transient());
        assert!(!GitHookError::UnsupportedProvider("svn".to_string()).is_transient());
        assert!(!GitHookError::malformed_url("nope", "missing host").is_transient());
    }
}
