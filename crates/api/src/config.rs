//! Process configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ORDER_SERVICE_ADDR` | `0.0.0.0:8081` |
//! | `PRODUCT_SERVICE_ADDR` | `0.0.0.0:8080` |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when persistent |
//! | `REDIS_URL` | `redis://localhost:6379` |
//! | `INVENTORY_SERVICE_URL` | `http://inventory-service` |
//! | `INVENTORY_TIMEOUT_MS` | unset (no timeout) |
//! | `NOTIFICATION_TOPIC` | `notificationTopic` |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_ORDER_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_PRODUCT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_INVENTORY_URL: &str = "http://inventory-service";
pub const DEFAULT_NOTIFICATION_TOPIC: &str = "notificationTopic";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set when USE_PERSISTENT_STORES=true")]
    Missing { var: &'static str },

    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub order_addr: SocketAddr,
    pub product_addr: SocketAddr,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub redis_url: String,
    pub inventory_url: String,
    pub inventory_timeout: Option<Duration>,
    pub notification_topic: String,
}

impl AppConfig {
    /// Read the process environment. Callers load `.env` beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let order_addr = parse_addr("ORDER_SERVICE_ADDR", get("ORDER_SERVICE_ADDR"), DEFAULT_ORDER_ADDR)?;
        let product_addr = parse_addr("PRODUCT_SERVICE_ADDR", get("PRODUCT_SERVICE_ADDR"), DEFAULT_PRODUCT_ADDR)?;

        let use_persistent_stores = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                var: "USE_PERSISTENT_STORES",
                value: v.clone(),
                reason: "expected true or false".to_string(),
            })?,
        };

        let database_url = get("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing { var: "DATABASE_URL" });
        }

        let inventory_timeout = match get("INVENTORY_TIMEOUT_MS") {
            None => None,
            Some(v) => {
                let ms: u64 = v.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    var: "INVENTORY_TIMEOUT_MS",
                    value: v.clone(),
                    reason: e.to_string(),
                })?;
                Some(Duration::from_millis(ms))
            }
        };

        Ok(Self {
            order_addr,
            product_addr,
            use_persistent_stores,
            database_url,
            redis_url: get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            inventory_url: get("INVENTORY_SERVICE_URL").unwrap_or_else(|| DEFAULT_INVENTORY_URL.to_string()),
            inventory_timeout,
            notification_topic: get("NOTIFICATION_TOPIC")
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_TOPIC.to_string()),
        })
    }
}

fn parse_addr(var: &'static str, value: Option<String>, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
        var,
        value: raw.clone(),
        reason: e.to_string(),
    })
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
