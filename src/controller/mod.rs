//! # Controller
//!
//! Core controller modules for the GitHook Controller.
//!
//! - `backoff`: Fibonacci backoff mechanism for retries
//! - `reconciler`: kube-rs reconciliation and status handling
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod reconciler;
pub mod server;
