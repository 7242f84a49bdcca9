//! 应用运行配置加载（`UDMI_` 前缀环境变量）。

use std::env;
use std::fmt;
use std::str::FromStr;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 文档存储后端。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
            Self::Redis => "redis",
        })
    }
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub store: StoreBackend,
    /// `store = postgres` 时必填。
    pub database_url: Option<String>,
    pub redis_url: String,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_topic: String,
    pub ingest_enabled: bool,
    pub validator_device_id: String,
    pub max_conflict_retries: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("UDMI_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let store = match read_optional("UDMI_STORE") {
            Some(value) => value
                .parse::<StoreBackend>()
                .map_err(|_| ConfigError::Invalid("UDMI_STORE".to_string(), value))?,
            None => StoreBackend::default(),
        };
        let database_url = read_optional("UDMI_DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("UDMI_DATABASE_URL".to_string()));
        }
        let redis_url =
            env::var("UDMI_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let mqtt_host = env::var("UDMI_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("UDMI_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("UDMI_MQTT_USERNAME");
        let mqtt_password = read_optional("UDMI_MQTT_PASSWORD");
        let mqtt_topic = env::var("UDMI_MQTT_TOPIC").unwrap_or_else(|_| "udmi/events".to_string());
        let ingest_enabled = read_bool_with_default("UDMI_INGEST", false);
        let validator_device_id = read_optional("UDMI_VALIDATOR_DEVICE_ID")
            .unwrap_or_else(|| "_validator".to_string());
        let max_conflict_retries = read_usize_with_default("UDMI_MAX_CONFLICT_RETRIES", 3)?;

        Ok(Self {
            http_addr,
            store,
            database_url,
            redis_url,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_topic,
            ingest_enabled,
            validator_device_id,
            max_conflict_retries,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
