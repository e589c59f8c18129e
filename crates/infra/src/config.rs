//! Configuration loading and representation.
//!
//! Everything comes from environment variables; `from_lookup` takes any
//! key → value function so tests never touch the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use agencyops_observability::LogFormat;

use crate::service::DEFAULT_LOOKUP_TIMEOUT;

pub const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `JWT_SECRET` (HS256 key used to verify session tokens).
    pub jwt_secret: String,
    /// `DATABASE_URL`; unset means seeded in-memory stores.
    pub database_url: Option<String>,
    /// `PERMISSION_LOOKUP_TIMEOUT_MS`
    pub permission_lookup_timeout: Duration,
    /// `LOG_FORMAT`
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.trim().parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let permission_lookup_timeout = match get("PERMISSION_LOOKUP_TIMEOUT_MS") {
            None => DEFAULT_LOOKUP_TIMEOUT,
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        key: "PERMISSION_LOOKUP_TIMEOUT_MS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        key: "PERMISSION_LOOKUP_TIMEOUT_MS",
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(ms)
            }
        };

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw.parse::<LogFormat>().map_err(|e: agencyops_observability::ParseLogFormatError| {
                ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            database_url: get("DATABASE_URL"),
            permission_lookup_timeout,
            log_format,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
