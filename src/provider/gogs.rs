//! Gogs webhook client
//!
//! Gogs exposes no single-hook lookup, so validation always lists the
//! repository's hooks and matches by id or callback URL.
//!
//! References:
//! - [Gogs API: Webhooks](https://github.com/gogs/docs-api/tree/master/Repositories/Webhooks.md)

use crate::error::Result;
use crate::hook::HookOptions;
use crate::provider::common::{self, effective_events, same_events};
use crate::provider::{GitProvider, HookClient, HookState};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, info_span, Instrument};
use zeroize::Zeroizing;

const PROVIDER: GitProvider = GitProvider::Gogs;

/// Gogs REST client bound to one repository
pub struct GogsClient {
    http: Client,
    hooks_url: Url,
    repository: String,
    access_token: Zeroizing<String>,
}

#[derive(Debug, Deserialize)]
struct Hook {
    id: u64,
    #[serde(default)]
    events: Vec<String>,
    #[serde(default)]
    config: BTreeMap<String, String>,
}

impl Hook {
    fn url(&self) -> Option<&str> {
        self.config.get("url").map(String::as_str)
    }
}

/// Body of `POST .../hooks` (with `type`) and `PATCH .../hooks/{id}` (without)
#[derive(Serialize)]
struct HookRequest<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    config: HookConfigRequest<'a>,
    events: Vec<String>,
    active: bool,
}

#[derive(Serialize)]
struct HookConfigRequest<'a> {
    url: &'a str,
    content_type: &'static str,
    secret: &'a str,
}

impl std::fmt::Debug for GogsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GogsClient")
            .field("hooks_url", &self.hooks_url.as_str())
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl GogsClient {
    /// # Errors
    /// Returns an error if the repository base URL cannot be turned into an API URL
    pub fn new(http: Client, options: &HookOptions) -> Result<Self> {
        let base = common::parse_base_url(PROVIDER, &options.base_url)?;
        let hooks_url = common::endpoint(
            PROVIDER,
            &base,
            &["api", "v1", "repos", &options.owner, &options.project, "hooks"],
        )?;
        Ok(Self {
            http,
            hooks_url,
            repository: options.repository(),
            access_token: options.access_token.clone(),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("token {}", self.access_token.as_str()))
    }

    async fn list_hooks(&self) -> Result<Vec<Hook>> {
        let request = self.request(Method::GET, self.hooks_url.clone());
        common::execute(PROVIDER, "list_hooks", request).await
    }

    fn body<'a>(options: &'a HookOptions, kind: Option<&'static str>) -> HookRequest<'a> {
        HookRequest {
            kind,
            config: HookConfigRequest {
                url: &options.callback_url,
                content_type: "json",
                secret: options.signing_secret.as_str(),
            },
            events: effective_events(&options.events),
            active: true,
        }
    }
}

#[async_trait]
impl HookClient for GogsClient {
    fn provider(&self) -> GitProvider {
        PROVIDER
    }

    async fn validate(&self, options: &HookOptions) -> Result<HookState> {
        let span = info_span!(
            "gogs.hook.validate",
            repository = %self.repository,
            hook.id = options.remote_hook_id.as_deref().unwrap_or("")
        );

        async move {
            let hooks = self.list_hooks().await?;
            let hook = match options.remote_hook_id.as_deref() {
                Some(hook_id) => hooks
                    .into_iter()
                    .find(|hook| hook.id.to_string() == hook_id)
                    .ok_or_else(|| common::hook_not_found(PROVIDER, hook_id))?,
                None => {
                    match hooks
                        .into_iter()
                        .find(|hook| hook.url() == Some(options.callback_url.as_str()))
                    {
                        Some(hook) => hook,
                        None => {
                            debug!("No hook with callback URL {}", options.callback_url);
                            return Ok(HookState::missing());
                        }
                    }
                }
            };

            let changed = hook.url() != Some(options.callback_url.as_str())
                || !same_events(&hook.events, &effective_events(&options.events));
            debug!(hook.id = hook.id, changed, "Found Gogs hook");
            Ok(HookState::found(hook.id.to_string(), changed))
        }
        .instrument(span)
        .await
    }

    async fn create(&self, options: &HookOptions) -> Result<String> {
        let span = info_span!("gogs.hook.create", repository = %self.repository);

        async move {
            let request = self
                .request(Method::POST, self.hooks_url.clone())
                .json(&Self::body(options, Some("gogs")));
            let hook: Hook = common::execute(PROVIDER, "create_hook", request).await?;
            info!(hook.id = hook.id, "Created Gogs hook on {}", self.repository);
            Ok(hook.id.to_string())
        }
        .instrument(span)
        .await
    }

    async fn update(&self, options: &HookOptions) -> Result<String> {
        let hook_id = common::require_hook_id(PROVIDER, options)?;
        let span = info_span!("gogs.hook.update", repository = %self.repository, hook.id = hook_id);

        async move {
            let url = common::endpoint(PROVIDER, &self.hooks_url, &[hook_id])?;
            let request = self
                .request(Method::PATCH, url)
                .json(&Self::body(options, None));
            let hook: Hook = common::execute(PROVIDER, "update_hook", request)
                .await
                .map_err(|e| common::missing_hook(PROVIDER, hook_id, e))?;
            info!(hook.id = hook.id, "Updated Gogs hook on {}", self.repository);
            Ok(hook_id.to_string())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_config_may_carry_extra_keys() {
        let hook: Hook = serde_json::from_value(serde_json::json!({
            "id": 12,
            "type": "gogs",
            "config": {"url": "http://githook.com", "content_type": "json"},
            "events": ["push"],
            "active": true
        }))
        .unwrap();

        assert_eq!(hook.url(), Some("http://githook.com"));
        assert_eq!(hook.events, vec!["push".to_string()]);
    }
}
