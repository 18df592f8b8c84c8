use std::env;

use auth::TokenLifetimes;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    /// Absent → reset links go to the in-memory outbox
    #[serde(default)]
    pub kafka: Option<KafkaConfig>,
    /// Administrator created at startup if absent (admins cannot self-register)
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: i64,
    #[serde(default = "default_reset_ttl_secs")]
    pub reset_ttl_secs: i64,
}

impl JwtConfig {
    pub fn lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access: chrono::Duration::seconds(self.access_ttl_secs),
            refresh: chrono::Duration::seconds(self.refresh_ttl_secs),
            reset: chrono::Duration::seconds(self.reset_ttl_secs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    #[serde(default = "default_kafka_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_display_name")]
    pub display_name: String,
}

fn default_admin_display_name() -> String {
    "Administrator".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_ttl_secs() -> i64 {
    3600
}

fn default_refresh_ttl_secs() -> i64 {
    7 * 24 * 3600
}

fn default_reset_ttl_secs() -> i64 {
    3600
}

fn default_kafka_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, STORAGE__BACKEND, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        Self::from_settings(configuration)
    }

    /// Deserialize layered settings and reject values the server cannot run with.
    ///
    /// # Errors
    /// * Missing or blank `jwt.secret`
    /// * Non-positive token lifetimes
    pub fn from_settings(settings: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Config = settings.try_deserialize()?;

        if config.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret is empty; set JWT__SECRET".to_string(),
            ));
        }

        if config.jwt.access_ttl_secs <= 0
            || config.jwt.refresh_ttl_secs <= 0
            || config.jwt.reset_ttl_secs <= 0
        {
            return Err(ConfigError::Message(
                "jwt token lifetimes must be positive".to_string(),
            ));
        }

        Ok(config)
    }
}
