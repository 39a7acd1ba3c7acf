//! # Custom Resource Definitions
//!
//! CRD types for the GitHook Controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `GitHook` desired state and secret references
//! - `status.rs` - Status types for tracking reconciliation state

mod spec;
mod status;

pub use spec::{GitHook, GitHookSpec, SecretKeySelector, SecretValueFromSource};
pub use status::{Condition, GitHookStatus};
