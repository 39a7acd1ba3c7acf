//! # GitHook Spec
//!
//! Desired state of a repository webhook.

use serde::{Deserialize, Serialize};

/// GitHook Custom Resource Definition
///
/// Declares a webhook that must exist on a repository hosted on GitHub,
/// GitLab or Gogs.
///
/// # Example
///
/// ```yaml
/// apiVersion: tools.githook.io/v1alpha1
/// kind: GitHook
/// metadata:
///   name: widgets-push
///   namespace: default
/// spec:
///   projectUrl: https://github.com/acme/widgets
///   gitProvider: github
///   eventTypes: ["push", "pull_request"]
///   accessToken:
///     secretKeyRef:
///       name: git-credentials
///       key: token
///   secretToken:
///     secretKeyRef:
///       name: webhook-secret
///       key: secret
/// ```
#[derive(kube::CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "GitHook",
    group = "tools.githook.io",
    version = "v1alpha1",
    namespaced,
    status = "crate::crd::GitHookStatus",
    shortname = "gh",
    printcolumn = r#"{"name":"Provider", "type":"string", "jsonPath":".spec.gitProvider"}, {"name":"Phase", "type":"string", "jsonPath":".status.phase"}, {"name":"HookID", "type":"string", "jsonPath":".status.Id"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GitHookSpec {
    /// Web URL of the repository, e.g. `https://gitlab.example.com/group/project`
    pub project_url: String,
    /// Hosting provider: `github`, `gitlab` or `gogs` (case-insensitive)
    ///
    /// Kept as a plain string so that unknown values reach the controller and
    /// surface as a status failure instead of being dropped at decode time.
    pub git_provider: String,
    /// API credential used to manage hooks on the repository
    pub access_token: SecretValueFromSource,
    /// Shared secret the git host uses to sign deliveries
    pub secret_token: SecretValueFromSource,
    /// Provider-specific event names, e.g. `push`, `merge_requests_events`
    #[serde(default)]
    pub event_types: Vec<String>,
}

/// Reference to a value held in a Kubernetes Secret
#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretValueFromSource {
    pub secret_key_ref: SecretKeySelector,
}

/// Selects a key of a Secret in the GitHook's namespace
#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema, PartialEq, Eq)]
pub struct SecretKeySelector {
    /// Name of the Secret
    pub name: String,
    /// Key inside the Secret's data
    pub key: String,
}

impl SecretKeySelector {
    #[must_use]
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

impl From<SecretKeySelector> for SecretValueFromSource {
    fn from(secret_key_ref: SecretKeySelector) -> Self {
        Self { secret_key_ref }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    #[test]
    fn test_spec_deserializes_camel_case_fields() {
        let spec: GitHookSpec = serde_json::from_value(serde_json::json!({
            "projectUrl": "https://github.com/acme/widgets",
            "gitProvider": "GitHub",
            "accessToken": {"secretKeyRef": {"name": "creds", "key": "token"}},
            "secretToken": {"secretKeyRef": {"name": "hook", "key": "secret"}},
            "eventTypes": ["push"]
        }))
        .unwrap();

        assert_eq!(spec.git_provider, "GitHub");
        assert_eq!(spec.access_token.secret_key_ref, SecretKeySelector::new("creds", "token"));
        assert_eq!(spec.event_types, vec!["push".to_string()]);
    }

    #[test]
    fn test_event_types_default_to_empty() {
        let spec: GitHookSpec = serde_json::from_value(serde_json::json!({
            "projectUrl": "https://github.com/acme/widgets",
            "gitProvider": "github",
            "accessToken": {"secretKeyRef": {"name": "creds", "key": "token"}},
            "secretToken": {"secretKeyRef": {"name": "hook", "key": "secret"}}
        }))
        .unwrap();

        assert!(spec.event_types.is_empty());
    }

    #[test]
    fn test_crd_metadata() {
        let crd = GitHook::crd();
        assert_eq!(crd.spec.group, "tools.githook.io");
        assert_eq!(crd.spec.names.kind, "GitHook");
        assert_eq!(crd.spec.names.short_names, Some(vec!["gh".to_string()]));
        assert_eq!(crd.spec.versions[0].name, "v1alpha1");
    }
}
