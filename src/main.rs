//! # GitHook Controller
//!
//! Watches `GitHook` resources and keeps the matching repository webhook on
//! GitHub, GitLab or Gogs registered with the configured callback URL, the
//! requested events and the signing secret.
//!
//! Configuration comes from environment variables, see [`ControllerConfig`]
//! and [`ServerConfig`]. Metrics and probes are served on `METRICS_PORT`.
//!
//! [`ControllerConfig`]: githook_controller::config::ControllerConfig
//! [`ServerConfig`]: githook_controller::config::ServerConfig

use anyhow::Result;
use githook_controller::runtime::initialization::initialize;
use githook_controller::runtime::watch_loop::run_watch_loop;

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;
    run_watch_loop(init.hooks, init.reconciler, init.server_state).await
}
