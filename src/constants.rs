//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Callback URL registered on every remote webhook unless `GITHOOK_CALLBACK_URL` is set
pub const DEFAULT_CALLBACK_URL: &str = "http://githook.com";

/// Default timeout applied to every outbound git provider API call (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Fibonacci backoff floor for failed reconciliations (minutes)
pub const DEFAULT_BACKOFF_MIN_MINUTES: u64 = 1;

/// Fibonacci backoff ceiling for failed reconciliations (minutes)
pub const DEFAULT_BACKOFF_MAX_MINUTES: u64 = 10;

/// Interval after which a healthy GitHook is checked against the remote again (seconds)
/// Catches hooks that were edited or deleted directly on the git host.
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 600;

/// Default delay before restarting the watch stream after it ends (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Field manager recorded on status patches
pub const FIELD_MANAGER: &str = "githook-controller";

/// Annotation bumped by `githookctl reconcile` to force a new reconciliation
pub const RECONCILE_ANNOTATION: &str = "tools.githook.io/reconcile";

/// User-Agent sent to git provider APIs (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("githook-controller/", env!("CARGO_PKG_VERSION"));

/// Page size used when listing hooks
pub const HOOK_PAGE_SIZE: u32 = 100;
