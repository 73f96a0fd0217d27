use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the server base URL
pub const ENV_URL: &str = "NENDB_URL";
/// Environment variable overriding the request timeout, in seconds
pub const ENV_TIMEOUT: &str = "NENDB_TIMEOUT";
/// Environment variable overriding the retry budget
pub const ENV_MAX_RETRIES: &str = "NENDB_MAX_RETRIES";

/// Serializable connection settings for a NenDB server.
///
/// This is the file/env facing form; `nendb-rs` turns it into a client
/// configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConnectionSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub skip_validation: bool,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            skip_validation: false,
        }
    }
}

impl ConnectionSettings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: ConnectionSettings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Apply `NENDB_URL`, `NENDB_TIMEOUT` and `NENDB_MAX_RETRIES` from the
    /// process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unparseable values are
    /// ignored with a warning.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            match raw.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", ENV_TIMEOUT, raw),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            match raw.parse() {
                Ok(retries) => self.max_retries = retries,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", ENV_MAX_RETRIES, raw),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.base_url, "http://localhost:8080");
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.retry_delay(), Duration::from_secs(1));
        assert!(!settings.skip_validation);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: ConnectionSettings =
            serde_json::from_str(r#"{"base_url":"http://db:9090","max_retries":5}"#).unwrap();
        assert_eq!(settings.base_url, "http://db:9090");
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.retry_delay_ms, 1000);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "http://remote:7000"),
            (ENV_TIMEOUT, "5"),
            (ENV_MAX_RETRIES, "not-a-number"),
        ]
        .into_iter()
        .collect();

        let settings = ConnectionSettings::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.base_url, "http://remote:7000");
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ConnectionSettings::load("/nonexistent/nendb.json").is_err());
    }
}
