//! # Configuration
//!
//! Settings are read once from environment variables at start-up. The
//! deployment populates them from a ConfigMap via `envFrom`.

mod controller;
mod server;

pub use controller::ControllerConfig;
pub use server::ServerConfig;

/// Parse `key` from `lookup`, falling back to `default` when unset or invalid
fn var_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read `key` as a string; an empty value counts as unset
fn var_or_default_str<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
