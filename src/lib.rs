//! GitHook Controller Library
//!
//! Kubernetes controller that keeps repository webhooks on GitHub, GitLab
//! and Gogs in line with `GitHook` custom resources.
//!
//! ## Quick Start
//!
//! ```rust
//! use githook_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod error;
pub mod hook;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
