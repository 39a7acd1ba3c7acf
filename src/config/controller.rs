//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use super::{process_env, var_or_default, var_or_default_str};
use crate::constants::{
    DEFAULT_BACKOFF_MAX_MINUTES, DEFAULT_BACKOFF_MIN_MINUTES, DEFAULT_CALLBACK_URL,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_RESYNC_INTERVAL_SECS, DEFAULT_WATCH_RESTART_DELAY_SECS,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// URL registered as the delivery target of every webhook (`GITHOOK_CALLBACK_URL`)
    pub callback_url: String,
    /// Timeout for each git provider API call in seconds (`HTTP_TIMEOUT_SECS`)
    pub http_timeout_secs: u64,
    /// Fibonacci backoff floor in minutes (`BACKOFF_MIN_MINUTES`)
    pub backoff_min_minutes: u64,
    /// Fibonacci backoff ceiling in minutes (`BACKOFF_MAX_MINUTES`)
    pub backoff_max_minutes: u64,
    /// Re-check interval for healthy resources in seconds (`RESYNC_INTERVAL_SECS`, 0 disables)
    pub resync_interval_secs: u64,
    /// Restrict the watch to one namespace (`WATCH_NAMESPACE`, unset watches all)
    pub watch_namespace: Option<String>,
    /// Watch stream restart delay after the stream ends (`WATCH_RESTART_DELAY_SECS`)
    pub watch_restart_delay_secs: u64,
    /// Log format, `json` or `text` (`LOG_FORMAT`)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let backoff_min_minutes =
            var_or_default(&lookup, "BACKOFF_MIN_MINUTES", DEFAULT_BACKOFF_MIN_MINUTES).max(1);
        let backoff_max_minutes =
            var_or_default(&lookup, "BACKOFF_MAX_MINUTES", DEFAULT_BACKOFF_MAX_MINUTES)
                .max(backoff_min_minutes);

        Self {
            callback_url: var_or_default_str(&lookup, "GITHOOK_CALLBACK_URL", DEFAULT_CALLBACK_URL),
            http_timeout_secs: var_or_default(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )
            .max(1),
            backoff_min_minutes,
            backoff_max_minutes,
            resync_interval_secs: var_or_default(
                &lookup,
                "RESYNC_INTERVAL_SECS",
                DEFAULT_RESYNC_INTERVAL_SECS,
            ),
            watch_namespace: lookup("WATCH_NAMESPACE")
                .map(|ns| ns.trim().to_string())
                .filter(|ns| !ns.is_empty()),
            watch_restart_delay_secs: var_or_default(
                &lookup,
                "WATCH_RESTART_DELAY_SECS",
                DEFAULT_WATCH_RESTART_DELAY_SECS,
            ),
            log_format: var_or_default_str(&lookup, "LOG_FORMAT", "json").to_lowercase(),
        }
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// `None` when periodic re-checks are disabled
    #[must_use]
    pub fn resync_interval(&self) -> Option<Duration> {
        (self.resync_interval_secs > 0).then(|| Duration::from_secs(self.resync_interval_secs))
    }

    #[must_use]
    pub fn watch_restart_delay(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }
}
