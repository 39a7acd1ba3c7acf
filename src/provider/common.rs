//! # Common Provider Utilities
//!
//! HTTP plumbing shared by the GitHub, GitLab and Gogs clients: endpoint
//! construction, request execution with metrics, and error mapping into
//! [`GitHookError::ProviderApi`].

use crate::constants::HOOK_PAGE_SIZE;
use crate::error::{GitHookError, Result};
use crate::hook::HookOptions;
use crate::observability::metrics;
use crate::provider::GitProvider;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

/// Event list actually registered when a GitHook declares none
pub(crate) const DEFAULT_EVENTS: &[&str] = &["push"];

/// Parse the repository base URL reported by the URL resolver
pub(crate) fn parse_base_url(provider: GitProvider, base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| {
        GitHookError::provider_api(provider, None, format!("invalid base URL '{base_url}': {e}"))
    })
}

/// Append `segments` to `root`, percent-encoding each one
///
/// A segment containing `/` (GitLab's `owner/project` id) is encoded as `%2F`.
pub(crate) fn endpoint(provider: GitProvider, root: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|()| {
            GitHookError::provider_api(provider, None, format!("cannot build API path on {root}"))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send `request`, record metrics and decode a JSON body
pub(crate) async fn execute<T: DeserializeOwned>(
    provider: GitProvider,
    operation: &'static str,
    request: RequestBuilder,
) -> Result<T> {
    let start = Instant::now();
    let result = send(provider, request).await;
    metrics::record_provider_operation(
        provider.as_str(),
        operation,
        start.elapsed().as_secs_f64(),
    );
    if let Err(e) = &result {
        metrics::increment_provider_operation_errors(provider.as_str());
        debug!(provider = %provider, operation, error = %e, "Provider call failed");
    }
    result
}

async fn send<T: DeserializeOwned>(provider: GitProvider, request: RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            "request timed out".to_string()
        } else {
            format!("request failed: {e}")
        };
        GitHookError::provider_api(provider, None, message)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GitHookError::provider_api(
            provider,
            Some(status.as_u16()),
            error_message(status, &body),
        ));
    }

    response.json::<T>().await.map_err(|e| {
        GitHookError::provider_api(
            provider,
            Some(status.as_u16()),
            format!("unexpected response body: {e}"),
        )
    })
}

/// Pull a readable message out of an error response
///
/// All three hosts answer with `{"message": ...}`; GitLab sometimes uses
/// `{"error": ...}` or nests field errors under `message`.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let field = value.get("message").or_else(|| value.get("error"));
        match field {
            Some(serde_json::Value::String(message)) => return message.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.chars().take(512).collect()
    }
}

/// Replace a 404 from a by-id lookup with a message naming the hook
pub(crate) fn missing_hook(provider: GitProvider, hook_id: &str, err: GitHookError) -> GitHookError {
    match err {
        GitHookError::ProviderApi {
            status: Some(404), ..
        } => hook_not_found(provider, hook_id),
        other => other,
    }
}

pub(crate) fn hook_not_found(provider: GitProvider, hook_id: &str) -> GitHookError {
    GitHookError::provider_api(
        provider,
        Some(404),
        format!("hook {hook_id} not found on the remote repository"),
    )
}

/// The hook id an update must target
pub(crate) fn require_hook_id(provider: GitProvider, options: &HookOptions) -> Result<&str> {
    options.remote_hook_id.as_deref().ok_or_else(|| {
        GitHookError::provider_api(provider, None, "cannot update a hook without an id")
    })
}

/// Events to register, substituting [`DEFAULT_EVENTS`] for an empty list
pub(crate) fn effective_events(events: &[String]) -> Vec<String> {
    if events.is_empty() {
        DEFAULT_EVENTS.iter().map(|e| (*e).to_string()).collect()
    } else {
        events.to_vec()
    }
}

/// Order-insensitive comparison of two event lists
pub(crate) fn same_events<A: AsRef<str>, B: AsRef<str>>(remote: &[A], desired: &[B]) -> bool {
    let remote: BTreeSet<&str> = remote.iter().map(AsRef::as_ref).collect();
    let desired: BTreeSet<&str> = desired.iter().map(AsRef::as_ref).collect();
    remote == desired
}

/// Whether a listing page was full, meaning another page may follow
pub(crate) fn is_full_page<T>(page: &[T]) -> bool {
    u32::try_from(page.len()).is_ok_and(|len| len >= HOOK_PAGE_SIZE)
}
