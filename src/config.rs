//! Environment configuration

use std::env::VarError;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub log_level: String,
    pub api_base: Option<String>,
    pub api_timeout_secs: u64,
    pub product_seed: Option<PathBuf>,
    pub db_max_connections: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("api_base", &self.api_base)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("product_seed", &self.product_seed)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> { build_app_config(|key| std::env::var(key)) }
}

/// Parses configuration from any env-var lookup, so tests can pass a map.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let optional = |var: &str| lookup(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let or_default = |var: &str, default: &str| optional(var).unwrap_or_else(|| default.to_string());

    fn parse<T: FromStr>(var: &str, raw: String) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar { var: var.to_string(), reason: e.to_string() })
    }

    let api_timeout_secs: u64 = parse("STOREFRONT_API_TIMEOUT_SECS", or_default("STOREFRONT_API_TIMEOUT_SECS", "30"))?;
    if api_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar { var: "STOREFRONT_API_TIMEOUT_SECS".into(), reason: "must be greater than zero".into() });
    }
    let db_max_connections: u32 = parse("STOREFRONT_DB_MAX_CONNECTIONS", or_default("STOREFRONT_DB_MAX_CONNECTIONS", "5"))?;
    if db_max_connections == 0 {
        return Err(ConfigError::InvalidEnvVar { var: "STOREFRONT_DB_MAX_CONNECTIONS".into(), reason: "must be greater than zero".into() });
    }

    Ok(AppConfig {
        database_url: or_default("DATABASE_URL", "sqlite://storefront.db?mode=rwc"),
        port: parse("PORT", or_default("PORT", "8083"))?,
        log_level: or_default("STOREFRONT_LOG_LEVEL", "info"),
        api_base: optional("STOREFRONT_API_BASE"),
        api_timeout_secs,
        product_seed: optional("STOREFRONT_PRODUCT_SEED").map(PathBuf::from),
        db_max_connections,
    })
}
