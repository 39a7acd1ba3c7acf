//! # Hook Reconciliation
//!
//! Provider-independent half of the controller: turns a `GitHook` spec into
//! [`HookOptions`] and drives a [`crate::provider::HookClient`] through the
//! validate / create / update decision.
//!
//! - `url` - splits `projectUrl` into base URL, owner and project
//! - `secrets` - reads access tokens and signing secrets from Kubernetes
//! - `options` - assembles everything a provider call needs
//! - `engine` - the reconciliation decision procedure

pub mod engine;
pub mod options;
pub mod secrets;
pub mod url;

pub use engine::{Engine, ReconcileOutcome};
pub use options::{HookOptions, ObservedState, OptionBuilder};
pub use secrets::{resolve_secret, KubeSecretStore, SecretStore};
pub use url::{resolve_repository_url, RepositoryLocation};
