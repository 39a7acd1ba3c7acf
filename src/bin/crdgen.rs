//! # CRD Generator
//!
//! Prints the `GitHook` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/githook.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use githook_controller::crd::GitHook;
use kube::core::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&GitHook::crd())?);
    Ok(())
}
