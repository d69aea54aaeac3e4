use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::observability::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub allowed_origin: String,
    pub identity_header: String,
    pub store_timeout: Duration,
    pub request_timeout: Duration,
    pub fleet_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            allowed_origin: "*".to_string(),
            identity_header: "x-authenticated-user".to_string(),
            store_timeout: Duration::from_millis(2_000),
            request_timeout: Duration::from_millis(10_000),
            fleet_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for keys that are absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            http_port: parse_or_default(&lookup, "HTTP_PORT", defaults.http_port)?,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_or_default(&lookup, "LOG_FORMAT", defaults.log_format)?,
            allowed_origin: lookup("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            identity_header: lookup("IDENTITY_HEADER").unwrap_or(defaults.identity_header),
            store_timeout: Duration::from_millis(parse_or_default(
                &lookup,
                "STORE_TIMEOUT_MS",
                2_000u64,
            )?),
            request_timeout: Duration::from_millis(parse_or_default(
                &lookup,
                "REQUEST_TIMEOUT_MS",
                10_000u64,
            )?),
            fleet_path: lookup("FLEET_FILE").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Store writes must give up before the whole request does.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.store_timeout >= self.request_timeout {
            return Err(AppError::Configuration(format!(
                "STORE_TIMEOUT_MS ({} ms) must be below REQUEST_TIMEOUT_MS ({} ms)",
                self.store_timeout.as_millis(),
                self.request_timeout.as_millis()
            )));
        }
        Ok(())
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Configuration(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}
