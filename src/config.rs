use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::transfer::IsolationLevel;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// PostgreSQL connection URL; `DATABASE_URL` takes precedence
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Connection pool settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Idle connections the pool keeps open
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connections older than this are closed and replaced; 0 disables
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
}

fn default_min_connections() -> u32 {
    5
}

fn default_max_lifetime_secs() -> u64 {
    300
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
            min_connections: default_min_connections(),
            max_lifetime_secs: default_max_lifetime_secs(),
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        (self.max_lifetime_secs > 0).then(|| Duration::from_secs(self.max_lifetime_secs))
    }
}

/// Transfer engine settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferConfig {
    pub isolation: IsolationLevel,
    /// Retries after the first attempt on serialization failure or deadlock
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Default deadline applied to every transfer; `None` means no timeout
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            isolation: IsolationLevel::ReadCommitted,
            max_retries: 3,
            retry_backoff_ms: 10,
            deadline_ms: None,
        }
    }
}

impl TransferConfig {
    /// Linear backoff before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(attempt as u64))
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve the connection URL, environment first
    pub fn database_url(&self) -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.postgres_url.clone())
    }
}
