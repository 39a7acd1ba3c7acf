//! GitHub webhook client
//!
//! REST v3 implementation for github.com and GitHub Enterprise Server.
//!
//! References:
//! - [Repository webhooks](https://docs.github.com/en/rest/repos/webhooks)

use crate::constants::HOOK_PAGE_SIZE;
use crate::error::Result;
use crate::hook::HookOptions;
use crate::provider::common::{self, effective_events, same_events};
use crate::provider::{GitProvider, HookClient, HookState};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};
use zeroize::Zeroizing;

const PROVIDER: GitProvider = GitProvider::GitHub;
const ACCEPT: &str = "application/vnd.github+json";

/// GitHub REST client bound to one repository
pub struct GitHubClient {
    http: Client,
    hooks_url: Url,
    repository: String,
    access_token: Zeroizing<String>,
}

/// Hook resource as returned by `GET /repos/{owner}/{repo}/hooks`
#[derive(Debug, Deserialize)]
struct Hook {
    id: u64,
    #[serde(default)]
    events: Vec<String>,
    #[serde(default)]
    config: HookConfig,
}

#[derive(Debug, Default, Deserialize)]
struct HookConfig {
    #[serde(default)]
    url: Option<String>,
}

/// Body of `POST .../hooks` and `PATCH .../hooks/{id}`
///
/// `name` must be `web` on create and is omitted on update.
#[derive(Serialize)]
struct HookRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
    active: bool,
    events: Vec<String>,
    config: HookConfigRequest<'a>,
}

#[derive(Serialize)]
struct HookConfigRequest<'a> {
    url: &'a str,
    content_type: &'static str,
    secret: &'a str,
    insecure_ssl: &'static str,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("hooks_url", &self.hooks_url.as_str())
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

/// API root for a repository host
///
/// `github.com` is served from `api.github.com`; any other host is treated as
/// GitHub Enterprise Server with the API under `/api/v3`.
pub(crate) fn api_root(base_url: &str) -> Result<Url> {
    let base = common::parse_base_url(PROVIDER, base_url)?;
    match base.host_str() {
        Some("github.com" | "www.github.com") => {
            common::parse_base_url(PROVIDER, "https://api.github.com")
        }
        _ => common::endpoint(PROVIDER, &base, &["api", "v3"]),
    }
}

impl GitHubClient {
    /// # Errors
    /// Returns an error if the repository base URL cannot be turned into an API URL
    pub fn new(http: Client, options: &HookOptions) -> Result<Self> {
        let root = api_root(&options.base_url)?;
        let hooks_url = common::endpoint(
            PROVIDER,
            &root,
            &["repos", &options.owner, &options.project, "hooks"],
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
            .header("Accept", ACCEPT)
    }

    fn hook_url(&self, hook_id: &str) -> Result<Url> {
        common::endpoint(PROVIDER, &self.hooks_url, &[hook_id])
    }

    async fn get_hook(&self, hook_id: &str) -> Result<Hook> {
        let url = self.hook_url(hook_id)?;
        common::execute(PROVIDER, "get_hook", self.request(Method::GET, url))
            .await
            .map_err(|e| common::missing_hook(PROVIDER, hook_id, e))
    }

    async fn list_hooks(&self) -> Result<Vec<Hook>> {
        let mut hooks = Vec::new();
        let mut page = 1u32;
        loop {
            let request = self
                .request(Method::GET, self.hooks_url.clone())
                .query(&[("per_page", HOOK_PAGE_SIZE), ("page", page)]);
            let batch: Vec<Hook> = common::execute(PROVIDER, "list_hooks", request).await?;
            let more = common::is_full_page(&batch);
            hooks.extend(batch);
            if !more {
                return Ok(hooks);
            }
            page += 1;
        }
    }

    fn body<'a>(options: &'a HookOptions, name: Option<&'static str>) -> HookRequest<'a> {
        HookRequest {
            name,
            active: true,
            events: effective_events(&options.events),
            config: HookConfigRequest {
                url: &options.callback_url,
                content_type: "json",
                secret: options.signing_secret.as_str(),
                insecure_ssl: "0",
            },
        }
    }
}

impl Hook {
    fn differs_from(&self, options: &HookOptions) -> bool {
        self.config.url.as_deref() != Some(options.callback_url.as_str())
            || !same_events(&self.events, &effective_events(&options.events))
    }
}

#[async_trait]
impl HookClient for GitHubClient {
    fn provider(&self) -> GitProvider {
        PROVIDER
    }

    async fn validate(&self, options: &HookOptions) -> Result<HookState> {
        let span = info_span!(
            "github.hook.validate",
            repository = %self.repository,
            hook.id = options.remote_hook_id.as_deref().unwrap_or("")
        );

        async move {
            let hook = match options.remote_hook_id.as_deref() {
                Some(hook_id) => self.get_hook(hook_id).await?,
                None => {
                    let found = self.list_hooks().await?.into_iter().find(|hook| {
                        hook.config.url.as_deref() == Some(options.callback_url.as_str())
                    });
                    match found {
                        Some(hook) => hook,
                        None => {
                            debug!("No hook with callback URL {}", options.callback_url);
                            return Ok(HookState::missing());
                        }
                    }
                }
            };

            let changed = hook.differs_from(options);
            debug!(hook.id = hook.id, changed, "Found GitHub hook");
            Ok(HookState::found(hook.id.to_string(), changed))
        }
        .instrument(span)
        .await
    }

    async fn create(&self, options: &HookOptions) -> Result<String> {
        let span = info_span!("github.hook.create", repository = %self.repository);

        async move {
            let request = self
                .request(Method::POST, self.hooks_url.clone())
                .json(&Self::body(options, Some("web")));
            let hook: Hook = common::execute(PROVIDER, "create_hook", request).await?;
            info!(hook.id = hook.id, "Created GitHub hook on {}", self.repository);
            Ok(hook.id.to_string())
        }
        .instrument(span)
        .await
    }

    async fn update(&self, options: &HookOptions) -> Result<String> {
        let hook_id = common::require_hook_id(PROVIDER, options)?;
        let span = info_span!("github.hook.update", repository = %self.repository, hook.id = hook_id);

        async move {
            let request = self
                .request(Method::PATCH, self.hook_url(hook_id)?)
                .json(&Self::body(options, None));
            let hook: Hook = common::execute(PROVIDER, "update_hook", request)
                .await
                .map_err(|e| common::missing_hook(PROVIDER, hook_id, e))?;
            info!(hook.id = hook.id, "Updated GitHub hook on {}", self.repository);
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
    fn test_api_root_for_github_dot_com() {
        assert_eq!(api_root("https://github.com").unwrap().as_str(), "https://api.github.com/");
    }

    #[test]
    fn test_api_root_for_enterprise_server() {
        assert_eq!(
            api_root("https://ghe.example.com:8443").unwrap().as_str(),
            "https://ghe.example.com:8443/api/v3"
        );
    }
}
