//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use githook_controller::prelude::*;
//! ```

pub use crate::crd::*;

pub use crate::error::GitHookError;

pub use crate::hook::{
    Engine, HookOptions, ObservedState, OptionBuilder, ReconcileOutcome, SecretStore,
};

pub use crate::provider::{ClientFactory, GitProvider, HookClient, HookState, HttpClientFactory};

pub use crate::controller::reconciler::{reconcile, BackoffState, Reconciler, ReconcilerError};

pub use crate::config::{ControllerConfig, ServerConfig};
