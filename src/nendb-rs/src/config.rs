use nendb_core::ConnectionSettings;
use std::time::Duration;

/// ClientConfig holds everything needed to build a [`crate::NenClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-attempt transport timeout, also the health probe deadline
    pub timeout: Duration,
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `retry_delay * n`
    pub retry_delay: Duration,
    /// Skip the startup health probe
    pub skip_validation: bool,
    /// Pre-built transport. When absent one is built from `timeout`.
    pub http_client: Option<reqwest::Client>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ConnectionSettings::default().into()
    }
}

impl From<ConnectionSettings> for ClientConfig {
    fn from(settings: ConnectionSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            retry_delay: settings.retry_delay(),
            base_url: settings.base_url,
            max_retries: settings.max_retries,
            skip_validation: settings.skip_validation,
            http_client: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}
