//! GitLab webhook client
//!
//! REST v4 implementation for gitlab.com and self-managed instances.
//! GitLab models events as one boolean attribute per event kind rather than
//! a list, so declared event names are translated through [`EVENT_FLAGS`].
//!
//! References:
//! - [Project webhooks API](https://docs.gitlab.com/ee/api/project_webhooks.html)

use crate::constants::HOOK_PAGE_SIZE;
use crate::error::{GitHookError, Result};
use crate::hook::HookOptions;
use crate::provider::common::{self, effective_events};
use crate::provider::{GitProvider, HookClient, HookState};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, info, info_span, Instrument};
use zeroize::Zeroizing;

const PROVIDER: GitProvider = GitProvider::GitLab;

/// Event name accepted in `eventTypes` and the hook attribute it enables
pub const EVENT_FLAGS: &[(&str, &str)] = &[
    ("push", "push_events"),
    ("tag_push", "tag_push_events"),
    ("merge_request", "merge_requests_events"),
    ("issues", "issues_events"),
    ("confidential_issues", "confidential_issues_events"),
    ("note", "note_events"),
    ("confidential_note", "confidential_note_events"),
    ("job", "job_events"),
    ("pipeline", "pipeline_events"),
    ("wiki_page", "wiki_page_events"),
    ("deployment", "deployment_events"),
    ("releases", "releases_events"),
];

/// GitLab REST client bound to one project
pub struct GitLabClient {
    http: Client,
    hooks_url: Url,
    repository: String,
    access_token: Zeroizing<String>,
}

/// Project hook as returned by `GET /projects/{id}/hooks`
#[derive(Debug, Deserialize)]
struct Hook {
    id: u64,
    #[serde(default)]
    url: String,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Hook {
    fn enabled_flags(&self) -> BTreeSet<&'static str> {
        EVENT_FLAGS
            .iter()
            .filter(|(_, flag)| {
                self.attributes
                    .get(*flag)
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .map(|(_, flag)| *flag)
            .collect()
    }
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("hooks_url", &self.hooks_url.as_str())
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

/// Translate declared events into hook attribute names
///
/// Both the short event name (`push`) and the attribute name (`push_events`)
/// are accepted. An empty list enables push events only.
///
/// # Errors
/// Returns `UnsupportedEvent` naming the first event GitLab has no attribute for
pub fn event_flags(events: &[String]) -> Result<BTreeSet<&'static str>> {
    effective_events(events)
        .iter()
        .map(|event| {
            EVENT_FLAGS
                .iter()
                .find(|(name, flag)| event == name || event == flag)
                .map(|(_, flag)| *flag)
                .ok_or_else(|| GitHookError::UnsupportedEvent {
                    provider: PROVIDER,
                    event: event.clone(),
                })
        })
        .collect()
}

impl GitLabClient {
    /// # Errors
    /// Returns an error if the repository base URL cannot be turned into an API URL
    pub fn new(http: Client, options: &HookOptions) -> Result<Self> {
        let base = common::parse_base_url(PROVIDER, &options.base_url)?;
        let repository = options.repository();
        let hooks_url = common::endpoint(
            PROVIDER,
            &base,
            &["api", "v4", "projects", &repository, "hooks"],
        )?;
        Ok(Self {
            http,
            hooks_url,
            repository,
            access_token: options.access_token.clone(),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("PRIVATE-TOKEN", self.access_token.as_str())
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

    /// Every known flag is sent, so events dropped from `eventTypes` are disabled
    fn body(options: &HookOptions, flags: &BTreeSet<&'static str>) -> Value {
        let mut body = Map::new();
        body.insert("url".to_string(), Value::from(options.callback_url.as_str()));
        body.insert("token".to_string(), Value::from(options.signing_secret.as_str()));
        body.insert("enable_ssl_verification".to_string(), Value::Bool(true));
        for (_, flag) in EVENT_FLAGS {
            body.insert((*flag).to_string(), Value::Bool(flags.contains(flag)));
        }
        Value::Object(body)
    }
}

#[async_trait]
impl HookClient for GitLabClient {
    fn provider(&self) -> GitProvider {
        PROVIDER
    }

    async fn validate(&self, options: &HookOptions) -> Result<HookState> {
        let desired = event_flags(&options.events)?;
        let span = info_span!(
            "gitlab.hook.validate",
            repository = %self.repository,
            hook.id = options.remote_hook_id.as_deref().unwrap_or("")
        );

        async move {
            let hook = match options.remote_hook_id.as_deref() {
                Some(hook_id) => self.get_hook(hook_id).await?,
                None => {
                    let found = self
                        .list_hooks()
                        .await?
                        .into_iter()
                        .find(|hook| hook.url == options.callback_url);
                    match found {
                        Some(hook) => hook,
                        None => {
                            debug!("No hook with callback URL {}", options.callback_url);
                            return Ok(HookState::missing());
                        }
                    }
                }
            };

            let changed = hook.url != options.callback_url || hook.enabled_flags() != desired;
            debug!(hook.id = hook.id, changed, "Found GitLab hook");
            Ok(HookState::found(hook.id.to_string(), changed))
        }
        .instrument(span)
        .await
    }

    async fn create(&self, options: &HookOptions) -> Result<String> {
        let flags = event_flags(&options.events)?;
        let span = info_span!("gitlab.hook.create", repository = %self.repository);

        async move {
            let request = self
                .request(Method::POST, self.hooks_url.clone())
                .json(&Self::body(options, &flags));
            let hook: Hook = common::execute(PROVIDER, "create_hook", request).await?;
            info!(hook.id = hook.id, "Created GitLab hook on {}", self.repository);
            Ok(hook.id.to_string())
        }
        .instrument(span)
        .await
    }

    async fn update(&self, options: &HookOptions) -> Result<String> {
        let hook_id = common::require_hook_id(PROVIDER, options)?;
        let flags = event_flags(&options.events)?;
        let span = info_span!("gitlab.hook.update", repository = %self.repository, hook.id = hook_id);

        async move {
            let request = self
                .request(Method::PUT, self.hook_url(hook_id)?)
                .json(&Self::body(options, &flags));
            let hook: Hook = common::execute(PROVIDER, "update_hook", request)
                .await
                .map_err(|e| common::missing_hook(PROVIDER, hook_id, e))?;
            info!(hook.id = hook.id, "Updated GitLab hook on {}", self.repository);
            Ok(hook_id.to_string())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn test_event_flags_accept_short_and_attribute_names() {
        let flags = event_flags(&events(&["push", "merge_requests_events", "tag_push"])).unwrap();
        assert_eq!(
            flags.into_iter().collect::<Vec<_>>(),
            vec!["merge_requests_events", "push_events", "tag_push_events"]
        );
    }

    #[test]
    fn test_empty_events_enable_push_only() {
        let flags = event_flags(&[]).unwrap();
        assert_eq!(flags.into_iter().collect::<Vec<_>>(), vec!["push_events"]);
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let err = event_flags(&events(&["push", "pull_request"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported gitlab event type 'pull_request'"
        );
    }

    #[test]
    fn test_enabled_flags_read_from_hook_attributes() {
        let hook: Hook = serde_json::from_value(serde_json::json!({
            "id": 3,
            "url": "http://githook.com",
            "push_events": true,
            "issues_events": false,
            "pipeline_events": true,
            "enable_ssl_verification": true
        }))
        .unwrap();

        assert_eq!(
            hook.enabled_flags().into_iter().collect::<Vec<_>>(),
            vec!["pipeline_events", "push_events"]
        );
    }
}
