use nendb_core::ConnectionSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: String,

    /// Upstream NenDB server
    #[serde(default)]
    pub nendb: ConnectionSettings,

    // CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Deadline for CRUD, query and statistics calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Deadline for algorithm runs
    #[serde(default = "default_algorithm_timeout")]
    pub algorithm_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_cors_enabled() -> bool {
    true
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_log_file")]
    pub file_name: String,

    /// Rotate when the active file reaches this size
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Rotated files kept per day
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_log_file() -> String {
    "nendb-gateway.log".to_string()
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_max_files() -> usize {
    9
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_name: default_log_file(),
            max_file_bytes: default_max_file_bytes(),
            max_files: default_max_files(),
        }
    }
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_algorithm_timeout() -> u64 {
    60
}

impl GatewayConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: GatewayConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn algorithm_timeout(&self) -> Duration {
        Duration::from_secs(self.algorithm_timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            nendb: ConnectionSettings::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
            request_timeout_secs: default_request_timeout(),
            algorithm_timeout_secs: default_algorithm_timeout(),
        }
    }
}
