//! Helpers for reading settings out of the process environment.
//!
//! Every loader takes a `lookup` function instead of calling
//! [`std::env::var`] directly, so tests can feed a fixed map without touching
//! the real environment.

use std::time::Duration;

use crate::error::CoreError;

/// Read a required, non-empty variable.
pub fn required<F>(lookup: &F, key: &str) -> Result<String, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Configuration(format!("{key} is not set")))
}

/// Read a required connection URL and check its scheme.
pub fn required_url<F>(lookup: &F, key: &str, schemes: &[&str]) -> Result<String, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = required(lookup, key)?;
    let valid = schemes
        .iter()
        .any(|scheme| url.starts_with(&format!("{scheme}://")));
    if !valid {
        return Err(CoreError::Configuration(format!(
            "{key} must use one of the schemes: {}",
            schemes.join(", ")
        )));
    }
    Ok(url)
}

/// Read an optional unsigned integer, falling back to `default`.
pub fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            CoreError::Configuration(format!("{key} must be a non-negative integer, got `{raw}`"))
        }),
    }
}

/// Read an optional duration in whole seconds.
pub fn secs_or<F>(lookup: &F, key: &str, default_secs: u64) -> Result<Duration, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default_secs).map(Duration::from_secs)
}

/// Lookup backed by the real process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
