use fineguard_core::config::{self, env_lookup};
use fineguard_core::error::CoreError;

/// HTTP server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Connection URLs
/// for the broker and the store live in their own configs
/// ([`BrokerConfig`](fineguard_events::BrokerConfig),
/// [`StoreConfig`](fineguard_db::StoreConfig)).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `7071`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Seconds a trigger route waits before answering with a timeout error
    /// (default: `60`). The triggered operation itself is never cut short.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `7071`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                       |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(env_lookup)
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = config::parse_or(&lookup, "PORT", 7071)?;
        let port = u16::try_from(port)
            .map_err(|_| CoreError::Configuration(format!("PORT must be a valid u16, got {port}")))?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = config::parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 60)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7071);
        assert_eq!(config.cors_origins, ["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let lookup = lookup_from(&[("CORS_ORIGINS", "https://a.example, https://b.example,,")]);
        let config = ServerConfig::from_lookup(lookup).unwrap();
        assert_eq!(config.cors_origins, ["https://a.example", "https://b.example"]);
    }

    #[test]
    fn out_of_range_port_is_configuration_error() {
        let lookup = lookup_from(&[("PORT", "70000")]);
        assert_matches!(
            ServerConfig::from_lookup(lookup),
            Err(CoreError::Configuration(_))
        );
    }
}
