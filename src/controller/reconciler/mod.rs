//! # Reconciler
//!
//! kube-rs glue around the hook engine: reads a `GitHook`, runs one
//! reconciliation attempt and writes the outcome back to its status.

mod reconcile;
pub mod status;
mod types;

pub use reconcile::reconcile;
pub use types::{BackoffState, Reconciler, ReconcilerError};
